// Copyright @yucwang 2026

use super::triangle::Triangle;

use crate::math::constants::{ Float, Vector2f, Vector3f, PI, TWO_PI };
use crate::math::transform::Transform;

use std::ops::Range;

/// Indexed triangle soup in object space. Scenes bake it into world-space
/// `Triangle`s when a `GeomKind::Mesh` instance references it.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<Vector3f>,
    normals:  Vec<Vector3f>,
    uvs:      Vec<Vector2f>,
    faces:    Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Vector3f>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, normals: Vec::new(), uvs: Vec::new(), faces }
    }

    /// Per-vertex normals; ignored unless one is given for every vertex.
    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vector2f>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Emits world-space triangles. Faces with an out-of-range index are skipped.
    pub fn triangles(&self, transform: &Transform, material_id: usize) -> Vec<Triangle> {
        let has_normals = !self.vertices.is_empty() && self.normals.len() == self.vertices.len();
        let has_uvs = !self.vertices.is_empty() && self.uvs.len() == self.vertices.len();
        let n = self.vertices.len();

        self.faces
            .iter()
            .filter(|face| face.iter().all(|&i| i < n))
            .map(|&[a, b, c]| {
                let mut tri = Triangle::new(self.vertices[a], self.vertices[b], self.vertices[c], material_id);
                if has_normals {
                    tri = tri.with_normals([self.normals[a], self.normals[b], self.normals[c]]);
                }
                if has_uvs {
                    tri = tri.with_uvs([self.uvs[a], self.uvs[b], self.uvs[c]]);
                }
                tri.transformed(transform)
            })
            .collect()
    }

    /// Unit quad in the xz plane, facing +y, spanning [-0.5, 0.5].
    pub fn quad() -> Self {
        let vertices = vec![
            Vector3f::new(-0.5, 0.0, -0.5),
            Vector3f::new( 0.5, 0.0, -0.5),
            Vector3f::new( 0.5, 0.0,  0.5),
            Vector3f::new(-0.5, 0.0,  0.5),
        ];
        let uvs = vec![
            Vector2f::new(0.0, 0.0),
            Vector2f::new(1.0, 0.0),
            Vector2f::new(1.0, 1.0),
            Vector2f::new(0.0, 1.0),
        ];
        Self::new(vertices, vec![[0, 2, 1], [0, 3, 2]]).with_uvs(uvs)
    }

    /// Latitude/longitude tessellation of a radius 0.5 sphere with smooth normals.
    pub fn uv_sphere(stacks: usize, slices: usize) -> Self {
        let stacks = stacks.max(2);
        let slices = slices.max(3);
        let mut vertices = Vec::with_capacity((stacks + 1) * (slices + 1));
        let mut normals = Vec::with_capacity(vertices.capacity());
        let mut uvs = Vec::with_capacity(vertices.capacity());

        for i in 0..=stacks {
            let v = i as Float / stacks as Float;
            let theta = v * PI;
            for j in 0..=slices {
                let u = j as Float / slices as Float;
                let phi = u * TWO_PI;
                let n = Vector3f::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                vertices.push(n * 0.5);
                normals.push(n);
                uvs.push(Vector2f::new(u, 1.0 - v));
            }
        }

        let mut faces = Vec::with_capacity(stacks * slices * 2);
        let row = slices + 1;
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * row + j;
                let b = a + row;
                if i != 0 {
                    faces.push([a, a + 1, b]);
                }
                if i + 1 != stacks {
                    faces.push([a + 1, b + 1, b]);
                }
            }
        }

        Self::new(vertices, faces).with_normals(normals).with_uvs(uvs)
    }
}

/// A mesh placed in a scene by geom `geom`: the slice of baked triangles it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    pub geom: usize,
    pub triangles: Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_faces_up() {
        let tris = TriangleMesh::quad().triangles(&Transform::default(), 3);
        assert_eq!(tris.len(), 2);
        for tri in &tris {
            assert_eq!(tri.material_id(), 3);
            let [a, b, c] = *tri.vertices();
            assert!(((b - a).cross(&(c - a)).normalize() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
        }
        let area: Float = tris.iter().map(|t| t.surface_area()).sum();
        assert!((area - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = TriangleMesh::uv_sphere(8, 16);
        let transform = Transform::from_trs(Vector3f::new(1.0, 2.0, 3.0), Vector3f::zeros(), Vector3f::new(2.0, 2.0, 2.0));
        let tris = mesh.triangles(&transform, 0);
        assert_eq!(tris.len(), mesh.face_count());
        assert_eq!(mesh.face_count(), 16 * 2 * (8 - 1));
        for tri in &tris {
            for v in tri.vertices() {
                assert!(((v - Vector3f::new(1.0, 2.0, 3.0)).norm() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_out_of_range_faces_are_skipped() {
        let mesh = TriangleMesh::new(
            vec![Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2], [0, 1, 7]],
        );
        assert_eq!(mesh.triangles(&Transform::default(), 0).len(), 1);
    }
}
