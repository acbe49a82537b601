// Copyright @yucwang 2026

use crate::core::interaction::SurfaceHit;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f, PI, TWO_PI };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// What a `Geom` instance stands for. Meshes point into `Scene::meshes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomKind {
    /// Sphere of radius 0.5 centered at the origin in object space.
    Sphere,
    /// Axis-aligned cube spanning [-0.5, 0.5] in object space.
    Cube,
    Mesh(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    pub kind: GeomKind,
    pub material_id: usize,
    pub transform: Transform,
}

impl Geom {
    pub fn new(kind: GeomKind, material_id: usize, transform: Transform) -> Self {
        Self { kind, material_id, transform }
    }

    /// World bounds of the unit shape; meshes report their own bounds through `Mesh`.
    pub fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for code in 0..8usize {
            let corner = Vector3f::new(if code & 1 != 0 { 0.5 } else { -0.5 },
                                       if code & 2 != 0 { 0.5 } else { -0.5 },
                                       if code & 4 != 0 { 0.5 } else { -0.5 });
            bbox.expand_by_point(&self.transform.apply_point(corner));
        }
        bbox
    }

    /// Approximate world surface area, used to weight emitters.
    pub fn surface_area(&self) -> Float {
        let dx = self.transform.apply_vector(Vector3f::new(1.0, 0.0, 0.0)).norm();
        let dy = self.transform.apply_vector(Vector3f::new(0.0, 1.0, 0.0)).norm();
        let dz = self.transform.apply_vector(Vector3f::new(0.0, 0.0, 1.0)).norm();
        match self.kind {
            GeomKind::Sphere => {
                let r = 0.5 * (dx + dy + dz) / 3.0;
                4.0 * PI * r * r
            }
            GeomKind::Cube => 2.0 * (dx * dy + dx * dz + dy * dz),
            GeomKind::Mesh(_) => 0.0,
        }
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        // Object-space ray with an unnormalized direction keeps t in world units.
        let o = self.transform.inv_apply_point(ray.origin());
        let d = self.transform.inv_apply_vector(ray.dir());

        let (t, n_local, uv) = match self.kind {
            GeomKind::Sphere => intersect_unit_sphere(&o, &d, ray)?,
            GeomKind::Cube => intersect_unit_cube(&o, &d, ray)?,
            GeomKind::Mesh(_) => return None,
        };

        let normal = self.transform.apply_normal(n_local).normalize();
        Some(SurfaceHit::new(t, normal, uv))
    }
}

fn intersect_unit_sphere(o: &Vector3f, d: &Vector3f, ray: &Ray3f) -> Option<(Float, Vector3f, Vector2f)> {
    let a = d.dot(d);
    let b = 2.0 * o.dot(d);
    let c = o.dot(o) - 0.25;
    let discriminant = b * b - 4.0 * a * c;
    if a <= 0.0 || discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);
    let t = if ray.test_segment(t0) {
        t0
    } else if ray.test_segment(t1) {
        t1
    } else {
        return None;
    };

    let p = o + d * t;
    let n = p.normalize();
    let mut phi = n.z.atan2(n.x);
    if phi < 0.0 {
        phi += TWO_PI;
    }
    let theta = n.y.clamp(-1.0, 1.0).acos();
    Some((t, n, Vector2f::new(phi / TWO_PI, 1.0 - theta / PI)))
}

fn intersect_unit_cube(o: &Vector3f, d: &Vector3f, ray: &Ray3f) -> Option<(Float, Vector3f, Vector2f)> {
    let mut t_min = ray.min_t;
    let mut t_max = ray.max_t;

    for axis in 0..3 {
        let dir = d[axis];
        if dir.abs() < EPSILON * EPSILON {
            if o[axis] < -0.5 || o[axis] > 0.5 {
                return None;
            }
            continue;
        }

        let inv = 1.0 / dir;
        let mut t0 = (-0.5 - o[axis]) * inv;
        let mut t1 = (0.5 - o[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_max < t_min {
            return None;
        }
    }

    // Origin outside the slab range means t_min is the entry face, otherwise we exit.
    let t_hit = if t_min > ray.min_t { t_min } else { t_max };
    if !ray.test_segment(t_hit) {
        return None;
    }

    let p = o + d * t_hit;
    let n = cube_normal(p);
    Some((t_hit, n, face_uv(&p, &n)))
}

fn cube_normal(p: Vector3f) -> Vector3f {
    let ax = p.x.abs();
    let ay = p.y.abs();
    let az = p.z.abs();
    if ax >= ay && ax >= az {
        Vector3f::new(p.x.signum(), 0.0, 0.0)
    } else if ay >= az {
        Vector3f::new(0.0, p.y.signum(), 0.0)
    } else {
        Vector3f::new(0.0, 0.0, p.z.signum())
    }
}

fn face_uv(p: &Vector3f, n: &Vector3f) -> Vector2f {
    if n.z.abs() > 0.5 {
        Vector2f::new(p.x + 0.5, p.y + 0.5)
    } else if n.y.abs() > 0.5 {
        Vector2f::new(p.x + 0.5, p.z + 0.5)
    } else {
        Vector2f::new(p.y + 0.5, p.z + 0.5)
    }
}
