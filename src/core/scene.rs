// Copyright @yucwang 2026

use crate::accel::Accelerator;
use crate::core::error::{MilleError, Result};
use crate::core::interaction::{ShadeableIntersection, SurfaceHit};
use crate::core::settings::RenderSettings;
use crate::materials::material::Material;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::distribution::Distribution1D;
use crate::math::ray::Ray3f;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::geom::{Geom, GeomKind};
use crate::shapes::mesh::{MeshInstance, TriangleMesh};
use crate::shapes::triangle::Triangle;

use std::path::PathBuf;

/// Camera and counters for one render.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub camera: PerspectiveCamera,
    pub iterations: u32,
    pub trace_depth: u32,
    pub image_name: String,
}

impl RenderState {
    /// Where the image goes when the caller names no output path.
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("{}.exr", self.image_name))
    }
}

/// Read-only scene: the material table, analytic geoms tested linearly, and
/// every mesh baked into world-space triangles behind one accelerator.
pub struct Scene {
    state: RenderState,
    materials: Vec<Material>,
    geoms: Vec<Geom>,
    triangles: Vec<Triangle>,
    analytic: Vec<usize>,
    accel: Accelerator,
}

impl Scene {
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.state.camera
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<ShadeableIntersection> {
        let mut closest: Option<(SurfaceHit, usize)> = self
            .accel
            .ray_intersection(ray, |prim_idx, ray| {
                self.triangles[prim_idx].ray_intersection(ray).map(|hit| (hit, hit.t))
            })
            .map(|(prim_idx, hit)| (hit, self.triangles[prim_idx].material_id()));

        let mut segment = *ray;
        if let Some((hit, _)) = &closest {
            segment.shrink_to(hit.t);
        }
        for &geom_idx in &self.analytic {
            let geom = &self.geoms[geom_idx];
            if let Some(hit) = geom.ray_intersection(&segment) {
                if segment.shrink_to(hit.t) {
                    closest = Some((hit, geom.material_id));
                }
            }
        }

        closest.map(|(hit, material_id)| {
            ShadeableIntersection::new(hit.t, ray.at(hit.t), hit.normal, material_id, hit.uv)
        })
    }
}

/// Emissive geoms with the probability of picking each one, proportional to
/// surface area times mean emitted radiance.
fn emitter_table(geoms: &[Geom],
                 materials: &[Material],
                 instances: &[MeshInstance],
                 triangles: &[Triangle]) -> Vec<(usize, Float)> {
    let (emitters, weights): (Vec<usize>, Vec<Float>) = geoms
        .iter()
        .enumerate()
        .filter(|(_, geom)| materials[geom.material_id].is_emissive())
        .map(|(geom_idx, geom)| {
            let area = match geom.kind {
                GeomKind::Mesh(_) => instances
                    .iter()
                    .find(|inst| inst.geom == geom_idx)
                    .map_or(0.0, |inst| triangles[inst.triangles.clone()].iter().map(|t| t.surface_area()).sum::<Float>()),
                _ => geom.surface_area(),
            };
            let emitted = materials[geom.material_id].emitted();
            (geom_idx, area * (emitted.x + emitted.y + emitted.z) / 3.0)
        })
        .unzip();

    let distribution = Distribution1D::new(&weights);
    emitters
        .into_iter()
        .enumerate()
        .map(|(i, geom_idx)| (geom_idx, distribution.pdf_discrete(i)))
        .collect()
}

#[derive(Default)]
pub struct SceneBuilder {
    materials: Vec<Material>,
    meshes: Vec<TriangleMesh>,
    geoms: Vec<Geom>,
    camera: Option<PerspectiveCamera>,
    image_name: Option<String>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_geom(&mut self, geom: Geom) -> usize {
        self.geoms.push(geom);
        self.geoms.len() - 1
    }

    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = Some(camera);
    }

    pub fn set_image_name(&mut self, name: &str) {
        self.image_name = Some(String::from(name));
    }

    pub fn build(self, settings: &RenderSettings) -> Result<Scene> {
        settings.validate()?;
        let camera = self.camera.ok_or(MilleError::MissingCamera)?;
        if camera.pixel_count() == 0 {
            return Err(MilleError::InvalidSettings(String::from("camera resolution must be non-zero")));
        }

        let mut triangles = Vec::new();
        let mut instances = Vec::new();
        let mut analytic = Vec::new();
        let mut bounds = AABB::default();
        for (geom_idx, geom) in self.geoms.iter().enumerate() {
            if geom.material_id >= self.materials.len() {
                return Err(MilleError::UnknownMaterial { geom: geom_idx, material: geom.material_id });
            }
            match geom.kind {
                GeomKind::Mesh(mesh_idx) => {
                    let mesh = self
                        .meshes
                        .get(mesh_idx)
                        .ok_or(MilleError::UnknownMesh { geom: geom_idx, mesh: mesh_idx })?;
                    let start = triangles.len();
                    triangles.extend(mesh.triangles(&geom.transform, geom.material_id));
                    if triangles.len() - start < mesh.face_count() {
                        log::warn!("mesh {}: skipped {} faces with out-of-range vertex indices",
                                   mesh_idx, mesh.face_count() - (triangles.len() - start));
                    }
                    for tri in &triangles[start..] {
                        bounds.expand_by_aabb(&tri.bounding_box());
                    }
                    instances.push(MeshInstance { geom: geom_idx, triangles: start..triangles.len() });
                }
                GeomKind::Sphere | GeomKind::Cube => {
                    bounds.expand_by_aabb(&geom.bounding_box());
                    analytic.push(geom_idx);
                }
            }
        }

        let accel = Accelerator::build(settings.accel, &triangles, &settings.build_options());
        let stats = accel.stats();
        log::info!("scene: {} geoms, {} triangles, {} analytic shapes",
                   self.geoms.len(), triangles.len(), analytic.len());
        log::info!("accel: {:?} with {} nodes, {} leaves, depth {}",
                   accel.kind(), stats.nodes, stats.leaves, stats.depth);

        let emitters = emitter_table(&self.geoms, &self.materials, &instances, &triangles);
        if emitters.is_empty() {
            log::warn!("scene has no emissive geometry; only the background will show");
        }
        for (geom_idx, pmf) in &emitters {
            log::info!("emitter: geom {} picked with probability {:.4}", geom_idx, pmf);
        }
        log::debug!("scene bounds: {:?} to {:?}", bounds.p_min, bounds.p_max);

        Ok(Scene {
            state: RenderState {
                camera,
                iterations: settings.iterations,
                trace_depth: settings.trace_depth,
                image_name: self.image_name.unwrap_or_else(|| String::from("mille")),
            },
            materials: self.materials,
            geoms: self.geoms,
            triangles,
            analytic,
            accel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::AccelKind;
    use crate::math::constants::Vector3f;
    use crate::math::transform::Transform;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(8, 8, Vector3f::new(0.0, 0.0, 5.0), Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), 45.0)
    }

    fn at(x: Float, y: Float, z: Float, scale: Float) -> Transform {
        Transform::from_trs(Vector3f::new(x, y, z), Vector3f::zeros(), Vector3f::new(scale, scale, scale))
    }

    fn builder() -> SceneBuilder {
        let mut builder = SceneBuilder::new();
        let white = builder.add_material(Material::diffuse(Vector3f::new(0.8, 0.8, 0.8)));
        let light = builder.add_material(Material::emitter(Vector3f::new(1.0, 1.0, 1.0), 2.0));
        let quad = builder.add_mesh(TriangleMesh::quad());
        builder.add_geom(Geom::new(GeomKind::Mesh(quad), white, at(0.0, -1.0, 0.0, 4.0)));
        builder.add_geom(Geom::new(GeomKind::Sphere, white, at(0.0, 0.0, 0.0, 1.0)));
        builder.add_geom(Geom::new(GeomKind::Cube, light, at(0.0, 3.0, 0.0, 1.0)));
        builder.set_camera(camera());
        builder
    }

    #[test]
    fn test_closest_hit_mixes_meshes_and_analytic_shapes() {
        for accel in [AccelKind::Bvh, AccelKind::FlatBvh, AccelKind::Octree] {
            let settings = RenderSettings { accel, ..RenderSettings::default() };
            let scene = builder().build(&settings).unwrap();
            assert_eq!(scene.triangles.len(), 2);

            // Straight down through the sphere onto the floor: sphere wins.
            let ray = Ray3f::new(Vector3f::new(0.0, 2.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
            let hit = scene.ray_intersection(&ray).unwrap();
            assert!((hit.t - 1.5).abs() < 1e-4);
            assert_eq!(hit.material_id, 0);

            // Beside the sphere: floor.
            let ray = Ray3f::new(Vector3f::new(1.5, 2.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
            let hit = scene.ray_intersection(&ray).unwrap();
            assert!((hit.t - 3.0).abs() < 1e-4);
            assert!((hit.point - Vector3f::new(1.5, -1.0, 0.0)).norm() < 1e-4);
            assert!((hit.surface_normal - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-4);

            // Up into the light.
            let ray = Ray3f::new(Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
            let hit = scene.ray_intersection(&ray).unwrap();
            assert_eq!(hit.material_id, 1);

            let ray = Ray3f::new(Vector3f::new(10.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
            assert!(scene.ray_intersection(&ray).is_none());
        }
    }

    #[test]
    fn test_emitters_weighted_by_area_and_power() {
        let mut lights = builder();
        lights.add_geom(Geom::new(GeomKind::Cube, 1, at(5.0, 3.0, 0.0, 2.0)));
        let table = emitter_table(&lights.geoms, &lights.materials, &[], &[]);
        // Unit cube has area 6, the doubled one 24.
        assert_eq!(table.len(), 2);
        assert_eq!((table[0].0, table[1].0), (2, 3));
        assert!((table[0].1 - 0.2).abs() < 1e-5);
        assert!((table[1].1 - 0.8).abs() < 1e-5);
        assert!(lights.build(&RenderSettings::default()).is_ok());
    }

    #[test]
    fn test_no_emitters_gives_empty_table() {
        let mut dark = SceneBuilder::new();
        let white = dark.add_material(Material::diffuse(Vector3f::new(0.5, 0.5, 0.5)));
        dark.add_geom(Geom::new(GeomKind::Sphere, white, Transform::default()));
        assert!(emitter_table(&dark.geoms, &dark.materials, &[], &[]).is_empty());
    }

    #[test]
    fn test_default_output_uses_image_name() {
        let mut named = builder();
        named.set_image_name("floor");
        let scene = named.build(&RenderSettings::default()).unwrap();
        assert_eq!(scene.state().default_output(), PathBuf::from("floor.exr"));
        let unnamed = builder().build(&RenderSettings::default()).unwrap();
        assert_eq!(unnamed.state().default_output(), PathBuf::from("mille.exr"));
    }

    #[test]
    fn test_validation_errors() {
        let mut bad_material = builder();
        bad_material.add_geom(Geom::new(GeomKind::Sphere, 9, Transform::default()));
        assert!(matches!(bad_material.build(&RenderSettings::default()),
                         Err(MilleError::UnknownMaterial { geom: 3, material: 9 })));

        let mut bad_mesh = builder();
        bad_mesh.add_geom(Geom::new(GeomKind::Mesh(4), 0, Transform::default()));
        assert!(matches!(bad_mesh.build(&RenderSettings::default()),
                         Err(MilleError::UnknownMesh { geom: 3, mesh: 4 })));

        let mut no_camera = SceneBuilder::new();
        no_camera.add_material(Material::default());
        assert!(matches!(no_camera.build(&RenderSettings::default()), Err(MilleError::MissingCamera)));

        let settings = RenderSettings { trace_depth: 0, ..RenderSettings::default() };
        assert!(matches!(builder().build(&settings), Err(MilleError::InvalidSettings(_))));
    }
}
