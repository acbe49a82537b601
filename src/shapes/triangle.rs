// Copyright @yucwang 2023

use crate::core::interaction::SurfaceHit;
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// World-space triangle with its bounds and centroid cached for the builders.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    vertices: [Vector3f; 3],
    normals: Option<[Vector3f; 3]>,
    uvs: Option<[Vector2f; 3]>,
    material_id: usize,
    centroid: Vector3f,
    bounds: AABB,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f, material_id: usize) -> Self {
        let vertices = [p0, p1, p2];
        Triangle {
            vertices,
            normals: None,
            uvs: None,
            material_id,
            centroid: (p0 + p1 + p2) / 3.0,
            bounds: AABB::from_points(&vertices),
        }
    }

    pub fn with_normals(mut self, normals: [Vector3f; 3]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: [Vector2f; 3]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Copy of this triangle moved by `transform`; normals use the inverse transpose.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let [p0, p1, p2] = self.vertices;
        let mut moved = Triangle::new(transform.apply_point(p0),
                                      transform.apply_point(p1),
                                      transform.apply_point(p2),
                                      self.material_id);
        if let Some(normals) = self.normals {
            moved = moved.with_normals(normals.map(|n| transform.apply_normal(n).normalize()));
        }
        if let Some(uvs) = self.uvs {
            moved = moved.with_uvs(uvs);
        }
        moved
    }

    pub fn bounding_box(&self) -> AABB {
        self.bounds
    }

    pub fn centroid(&self) -> Vector3f {
        self.centroid
    }

    pub fn vertices(&self) -> &[Vector3f; 3] {
        &self.vertices
    }

    pub fn material_id(&self) -> usize {
        self.material_id
    }

    pub fn surface_area(&self) -> Float {
        0.5 * ((self.vertices[1] - self.vertices[0]).cross(&(self.vertices[2] - self.vertices[0]))).norm()
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceHit> {
        let [p0, p1, p2] = self.vertices;
        let cross = (p1 - p0).cross(&(p2 - p0));
        if cross.norm_squared() < EPSILON * EPSILON * EPSILON {
            return None;
        }
        let geo_normal = cross.normalize();

        let n_dot_dir = geo_normal.dot(&ray.dir());
        if n_dot_dir > -EPSILON && n_dot_dir < EPSILON {
            return None;
        }

        let plane_d = geo_normal.dot(&p0);
        let t = (plane_d - geo_normal.dot(&ray.origin())) / n_dot_dir;
        if !ray.test_segment(t) {
            return None;
        }

        let p = ray.at(t);
        if !self.is_in_triangle(&p, &cross) {
            return None;
        }

        let bary = self.barycentric(&p);
        let normal = match self.normals {
            Some([n0, n1, n2]) => (n0 * bary.x + n1 * bary.y + n2 * bary.z).normalize(),
            None => geo_normal,
        };
        let uv = match self.uvs {
            Some([uv0, uv1, uv2]) => uv0 * bary.x + uv1 * bary.y + uv2 * bary.z,
            None => Vector2f::new(bary.y, bary.z),
        };

        Some(SurfaceHit::new(t, normal, uv))
    }

    fn is_in_triangle(&self, p: &Vector3f, geo_normal: &Vector3f) -> bool {
        let [p0, p1, p2] = self.vertices;
        let n0 = (p1 - p0).cross(&(p - p0));
        let n1 = (p2 - p1).cross(&(p - p1));
        let n2 = (p0 - p2).cross(&(p - p2));

        (n0.dot(geo_normal) >= 0.0) && (n1.dot(geo_normal) >= 0.0) && (n2.dot(geo_normal) >= 0.0)
    }

    pub fn barycentric(&self, p: &Vector3f) -> Vector3f {
        let [p0, p1, p2] = self.vertices;
        let v0 = p1 - p0;
        let v1 = p2 - p0;
        let v2 = *p - p0;

        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < EPSILON * EPSILON {
            return Vector3f::new(1.0, 0.0, 0.0);
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        let u = 1.0 - v - w;
        Vector3f::new(u, v, w)
    }
}
