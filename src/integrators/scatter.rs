// Copyright @yucwang 2026

use super::path::PathSegment;

use crate::core::rng::Sampler;
use crate::core::settings::HemisphereSampling;
use crate::materials::material::{Material, ScatterLobe};
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::{sample_concentric_hemisphere, sample_cosine_hemisphere};

/// Probability scale applied to the Fresnel reflectance when choosing reflection.
const FRESNEL_REFLECT_SCALE: Float = 0.9;
/// Chance that a dielectric path is killed after choosing its direction.
const ROULETTE_KILL: Float = 0.1;
const JITTER_SCALE: Float = 0.3;
/// Refracted vectors shorter than this mean total internal reflection.
const TIR_THRESHOLD: Float = 0.01;

/// Advances `path` off a non-emissive surface hit at `point` with outward
/// `normal`: picks the new direction, scales the throughput, and restarts
/// the ray just off the surface. Does not touch `remaining_bounces` except
/// to zero it when the path is killed by Russian roulette.
pub fn scatter_ray<S: Sampler>(path: &mut PathSegment,
                               point: &Vector3f,
                               normal: &Vector3f,
                               material: &Material,
                               hemisphere: HemisphereSampling,
                               sampler: &mut S) {
    let incoming = path.ray.dir();

    let (direction, tint) = match material.lobe() {
        ScatterLobe::Diffuse => {
            let facing = if normal.dot(&incoming) > 0.0 { -*normal } else { *normal };
            (sample_hemisphere(&facing, hemisphere, sampler), material.color)
        }
        ScatterLobe::Mirror => (reflect(&incoming, normal), material.specular.color),
        ScatterLobe::Refractive => (refract_or_reflect(&incoming, normal, material.index_of_refraction),
                                    material.specular.color),
        ScatterLobe::Fresnel => {
            let oriented = oriented_normal(&incoming, normal);
            let reflectance = schlick(normal.dot(&incoming).abs(), material.index_of_refraction);
            let chosen = if sampler.next_f32() < FRESNEL_REFLECT_SCALE * reflectance {
                reflect(&incoming, &oriented)
            } else {
                refract_or_reflect(&incoming, normal, material.index_of_refraction)
            };

            if sampler.next_f32() < ROULETTE_KILL {
                path.throughput = Vector3f::zeros();
                path.remaining_bounces = 0;
                return;
            }

            let side = if chosen.dot(&oriented) >= 0.0 { oriented } else { -oriented };
            let jitter = sample_hemisphere(&side, hemisphere, sampler);
            ((chosen + jitter * JITTER_SCALE).normalize(), material.specular.color)
        }
    };

    path.throughput = path.throughput.component_mul(&tint);
    path.ray = Ray3f::continued(point, &direction);
}

fn sample_hemisphere<S: Sampler>(normal: &Vector3f, hemisphere: HemisphereSampling, sampler: &mut S) -> Vector3f {
    let u = sampler.next_2d();
    match hemisphere {
        HemisphereSampling::Cosine => sample_cosine_hemisphere(normal, &u),
        HemisphereSampling::Concentric => sample_concentric_hemisphere(normal, &u),
    }
}

/// `normal` flipped to face against `dir`.
fn oriented_normal(dir: &Vector3f, normal: &Vector3f) -> Vector3f {
    if normal.dot(dir) < 0.0 { *normal } else { -*normal }
}

pub fn reflect(dir: &Vector3f, normal: &Vector3f) -> Vector3f {
    dir - normal * (2.0 * normal.dot(dir))
}

/// Refraction of unit `dir` through a surface whose `normal` faces against
/// it, with `eta` the ratio of indices. Zero on total internal reflection.
pub fn refract(dir: &Vector3f, normal: &Vector3f, eta: Float) -> Vector3f {
    let cos_i = normal.dot(dir);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vector3f::zeros()
    } else {
        dir * eta - normal * (eta * cos_i + k.sqrt())
    }
}

fn refract_or_reflect(dir: &Vector3f, normal: &Vector3f, ior: Float) -> Vector3f {
    let entering = normal.dot(dir) < 0.0;
    let eta = if entering { 1.0 / ior } else { ior };
    let oriented = oriented_normal(dir, normal);
    let refracted = refract(dir, &oriented, eta);
    if refracted.norm() < TIR_THRESHOLD {
        reflect(dir, &oriented)
    } else {
        refracted.normalize()
    }
}

/// Schlick's approximation of the Fresnel reflectance.
pub fn schlick(cos_theta: Float, ior: Float) -> Float {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).max(0.0).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::tests::ScriptedSampler;
    use crate::core::rng::LcgRng;
    use crate::math::constants::RAY_OFFSET;

    fn up() -> Vector3f {
        Vector3f::new(0.0, 1.0, 0.0)
    }

    fn segment(origin: Vector3f, dir: Vector3f) -> PathSegment {
        PathSegment::new(Ray3f::new(origin, dir, None, None), 0, 5)
    }


    #[test]
    fn test_diffuse_scales_throughput_once() {
        let material = Material::diffuse(Vector3f::new(0.5, 0.5, 0.5));
        let mut rng = LcgRng::new(5);
        for hemisphere in [HemisphereSampling::Cosine, HemisphereSampling::Concentric] {
            for _ in 0..64 {
                let mut path = segment(Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.3, -1.0, 0.1));
                scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, hemisphere, &mut rng);
                assert_eq!(path.throughput, Vector3f::new(0.5, 0.5, 0.5));
                assert!(path.ray.dir().dot(&up()) >= 0.0);
                assert!((path.ray.origin() - path.ray.dir() * RAY_OFFSET).norm() < 1e-6);
                assert_eq!(path.remaining_bounces, 5);
            }
        }
    }

    #[test]
    fn test_diffuse_from_behind_stays_on_incoming_side() {
        let material = Material::diffuse(Vector3f::new(0.8, 0.8, 0.8));
        let mut rng = LcgRng::new(6);
        for _ in 0..32 {
            let mut path = segment(Vector3f::new(0.0, -1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
            scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut rng);
            assert!(path.ray.dir().dot(&up()) <= 0.0);
        }
    }

    #[test]
    fn test_mirror_is_exact_reflection() {
        let material = Material::mirror(Vector3f::new(0.9, 0.8, 0.7));
        let mut path = segment(Vector3f::new(-1.0, 1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0));
        let incoming = path.ray.dir();
        let mut sampler = ScriptedSampler::new(&[0.5]);
        scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut sampler);
        let expected = reflect(&incoming, &up());
        assert!((path.ray.dir() - expected).norm() < 1e-6);
        assert!((path.ray.dir() - Vector3f::new(1.0, 1.0, 0.0).normalize()).norm() < 1e-6);
        assert_eq!(path.throughput, Vector3f::new(0.9, 0.8, 0.7));
    }

    #[test]
    fn test_refraction_bends_toward_normal_on_entry() {
        let material = Material::glass(Vector3f::new(1.0, 1.0, 1.0), 1.5);
        let mut path = segment(Vector3f::new(-1.0, 1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0));
        let mut sampler = ScriptedSampler::new(&[0.5]);
        scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut sampler);
        let dir = path.ray.dir();
        assert!(dir.y < 0.0);
        // Snell: sin(t) = sin(45 deg) / 1.5
        let sin_t = (dir.x * dir.x + dir.z * dir.z).sqrt();
        assert!((sin_t - (0.5f32).sqrt() / 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_total_internal_reflection_falls_back_to_mirror() {
        let material = Material::glass(Vector3f::new(1.0, 1.0, 1.0), 1.5);
        // Leaving the medium at a grazing angle through an outward normal.
        let dir = Vector3f::new(0.9, 0.2, 0.0).normalize();
        let mut path = segment(Vector3f::new(-0.9, -0.2, 0.0), dir);
        let mut sampler = ScriptedSampler::new(&[0.5]);
        scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut sampler);
        assert!((path.ray.dir() - reflect(&dir, &up())).norm() < 1e-5);
        assert!(path.ray.dir().y < 0.0);
    }

    #[test]
    fn test_roulette_kills_either_branch() {
        let material = Material::dielectric(Vector3f::new(1.0, 1.0, 1.0), 1.5);
        // First draw picks reflect (0.0) or refract (0.99); second draw is the kill.
        for choice in [0.0, 0.99] {
            let mut path = segment(Vector3f::new(-1.0, 1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0));
            let mut sampler = ScriptedSampler::new(&[choice, 0.05]);
            scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut sampler);
            assert_eq!(path.throughput, Vector3f::zeros());
            assert_eq!(path.remaining_bounces, 0);
            assert!(!path.is_active());
        }
    }

    #[test]
    fn test_fresnel_survivor_is_jittered_and_tinted() {
        let material = Material::dielectric(Vector3f::new(0.5, 1.0, 1.0), 1.5);
        let mut path = segment(Vector3f::new(-1.0, 1.0, 0.0), Vector3f::new(1.0, -1.0, 0.0));
        let incoming = path.ray.dir();
        let mut sampler = ScriptedSampler::new(&[0.0, 0.5, 0.25, 0.75]);
        scatter_ray(&mut path, &Vector3f::zeros(), &up(), &material, HemisphereSampling::Cosine, &mut sampler);
        let dir = path.ray.dir();
        assert!((dir.norm() - 1.0).abs() < 1e-5);
        // Reflected then perturbed: stays above the surface, near the mirror direction.
        assert!(dir.y > 0.0);
        assert!(dir.dot(&reflect(&incoming, &up())) > 0.8);
        assert_eq!(path.throughput, Vector3f::new(0.5, 1.0, 1.0));
        assert_eq!(path.remaining_bounces, 5);
    }

    #[test]
    fn test_schlick_limits() {
        assert!((schlick(1.0, 1.5) - 0.04).abs() < 1e-6);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-6);
        assert!(schlick(0.5, 1.0).abs() < 0.04);
    }
}
