// Copyright @yucwang 2023

use super::constants::{ PI, TWO_PI, SQRT_OF_ONE_THIRD, Float, Vector2f, Vector3f };

/// Two unit vectors completing `normal` to an orthonormal frame.
///
/// The reference axis is the first world axis whose component in `normal` is
/// below sqrt(1/3), which can never be parallel to `normal`.
pub fn orthonormal_basis(normal: &Vector3f) -> (Vector3f, Vector3f) {
    let not_normal = if normal.x.abs() < SQRT_OF_ONE_THIRD {
        Vector3f::new(1.0, 0.0, 0.0)
    } else if normal.y.abs() < SQRT_OF_ONE_THIRD {
        Vector3f::new(0.0, 1.0, 0.0)
    } else {
        Vector3f::new(0.0, 0.0, 1.0)
    };

    let perpendicular1 = normal.cross(&not_normal).normalize();
    let perpendicular2 = normal.cross(&perpendicular1).normalize();
    (perpendicular1, perpendicular2)
}

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    return Vector2f::new(r * cos_phi, r * sin_phi)
}

/// Cosine-weighted direction about `normal` from `cos(theta) = sqrt(u.x)`, `phi = 2 pi u.y`.
pub fn sample_cosine_hemisphere(normal: &Vector3f, u: &Vector2f) -> Vector3f {
    let up = u.x.sqrt();
    let over = (1.0 - up * up).max(0.0).sqrt();
    let around = u.y * TWO_PI;

    let (perpendicular1, perpendicular2) = orthonormal_basis(normal);
    up * *normal
        + around.cos() * over * perpendicular1
        + around.sin() * over * perpendicular2
}

/// Same distribution as `sample_cosine_hemisphere`, lifted from the concentric disk mapping.
pub fn sample_concentric_hemisphere(normal: &Vector3f, u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(u);
    let z = (1. - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    let (perpendicular1, perpendicular2) = orthonormal_basis(normal);
    (p.x * perpendicular1 + p.y * perpendicular2 + z * *normal).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Vector2f> {
        let mut samples = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                samples.push(Vector2f::new((i as Float + 0.5) / n as Float,
                                           (j as Float + 0.5) / n as Float));
            }
        }
        samples
    }

    #[test]
    fn test_orthonormal_basis() {
        let normals = [Vector3f::new(0.0, 0.0, 1.0),
                       Vector3f::new(1.0, 0.0, 0.0),
                       Vector3f::new(1.0, 1.0, 1.0).normalize(),
                       Vector3f::new(-0.2, 0.9, 0.1).normalize()];
        for n in normals.iter() {
            let (t, b) = orthonormal_basis(n);
            assert!(t.dot(n).abs() < 1e-5);
            assert!(b.dot(n).abs() < 1e-5);
            assert!(t.dot(&b).abs() < 1e-5);
            assert!((t.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_concentric_disk_center() {
        let p = sample_uniform_disk_concentric(&Vector2f::new(0.5, 0.5));
        assert_eq!(p, Vector2f::new(0.0, 0.0));
        assert!(!p.x.is_nan() && !p.y.is_nan());
    }

    #[test]
    fn test_hemisphere_samples_stay_above_surface() {
        let normal = Vector3f::new(0.3, -0.5, 0.8).normalize();
        for u in grid(16).iter() {
            let d0 = sample_cosine_hemisphere(&normal, u);
            let d1 = sample_concentric_hemisphere(&normal, u);
            assert!(d0.dot(&normal) >= -1e-5);
            assert!(d1.dot(&normal) >= -1e-5);
            assert!((d0.norm() - 1.0).abs() < 1e-4);
            assert!((d1.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cosine_weighted_mean() {
        // E[cos theta] = 2/3 under a cosine-weighted distribution.
        let normal = Vector3f::new(0.0, 1.0, 0.0);
        let samples = grid(64);
        let mean0: Float = samples.iter().map(|u| sample_cosine_hemisphere(&normal, u).y).sum::<Float>()
            / samples.len() as Float;
        let mean1: Float = samples.iter().map(|u| sample_concentric_hemisphere(&normal, u).y).sum::<Float>()
            / samples.len() as Float;
        assert!((mean0 - 2.0 / 3.0).abs() < 1e-2);
        assert!((mean1 - 2.0 / 3.0).abs() < 1e-2);
    }
}
