// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::core::scene::{Scene, SceneBuilder};
use crate::core::settings::RenderSettings;
use crate::materials::material::Material;
use crate::math::constants::{Float, Vector3f};
use crate::math::transform::Transform;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::geom::{Geom, GeomKind};
use crate::shapes::mesh::TriangleMesh;

fn trs(translation: [Float; 3], rotation: [Float; 3], scale: [Float; 3]) -> Transform {
    Transform::from_trs(Vector3f::from(translation), Vector3f::from(rotation), Vector3f::from(scale))
}

/// Ten-unit Cornell box lit by a ceiling panel, with a mirror sphere. The
/// floor quad and a tessellated glass sphere go through the triangle accelerator.
pub fn cornell_box(settings: &RenderSettings, width: usize, height: usize) -> Result<Scene> {
    let mut builder = SceneBuilder::new();

    let light = builder.add_material(Material::emitter(Vector3f::new(1.0, 1.0, 1.0), 5.0));
    let white = builder.add_material(Material::diffuse(Vector3f::new(0.98, 0.98, 0.98)));
    let red = builder.add_material(Material::diffuse(Vector3f::new(0.85, 0.35, 0.35)));
    let green = builder.add_material(Material::diffuse(Vector3f::new(0.35, 0.85, 0.35)));
    let mirror = builder.add_material(Material::mirror(Vector3f::new(0.98, 0.98, 0.98)));
    let glass = builder.add_material(Material::dielectric(Vector3f::new(0.9, 0.95, 1.0), 1.5));

    builder.add_geom(Geom::new(GeomKind::Cube, light, trs([0.0, 10.0, 0.0], [0.0; 3], [3.0, 0.3, 3.0])));
    let floor = builder.add_mesh(TriangleMesh::quad());
    builder.add_geom(Geom::new(GeomKind::Mesh(floor), white, trs([0.0, 0.0, 0.0], [0.0; 3], [10.0, 1.0, 10.0])));
    builder.add_geom(Geom::new(GeomKind::Cube, white, trs([0.0, 10.0, 0.0], [0.0, 0.0, 90.0], [0.01, 10.0, 10.0])));
    builder.add_geom(Geom::new(GeomKind::Cube, white, trs([0.0, 5.0, -5.0], [0.0, 90.0, 0.0], [0.01, 10.0, 10.0])));
    builder.add_geom(Geom::new(GeomKind::Cube, red, trs([-5.0, 5.0, 0.0], [0.0; 3], [0.01, 10.0, 10.0])));
    builder.add_geom(Geom::new(GeomKind::Cube, green, trs([5.0, 5.0, 0.0], [0.0; 3], [0.01, 10.0, 10.0])));
    builder.add_geom(Geom::new(GeomKind::Sphere, mirror, trs([-1.5, 3.0, -1.5], [0.0; 3], [3.0, 3.0, 3.0])));

    let sphere_mesh = builder.add_mesh(TriangleMesh::uv_sphere(24, 48));
    builder.add_geom(Geom::new(GeomKind::Mesh(sphere_mesh), glass, trs([2.0, 1.5, 1.5], [0.0; 3], [3.0, 3.0, 3.0])));

    let camera = PerspectiveCamera::new(width,
                                        height,
                                        Vector3f::new(0.0, 5.0, 10.5),
                                        Vector3f::new(0.0, 5.0, 0.0),
                                        Vector3f::new(0.0, 1.0, 0.0),
                                        60.0);
    builder.set_camera(camera.with_lens(settings.lens_radius, settings.focal_distance));
    builder.set_image_name("cornell");
    builder.build(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::ray::Ray3f;

    #[test]
    fn test_cornell_box_assembles() {
        let scene = cornell_box(&RenderSettings::default(), 16, 16).unwrap();
        assert_eq!(scene.state().image_name, "cornell");
        assert_eq!(scene.state().default_output(), std::path::PathBuf::from("cornell.exr"));
        assert_eq!(scene.camera().pixel_count(), 256);

        let down = Ray3f::new(Vector3f::new(0.5, 5.0, 3.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let floor = scene.ray_intersection(&down).unwrap();
        assert_eq!(floor.material_id, 1);
        assert!(floor.point.y.abs() < 1e-4);
        assert!((floor.surface_normal - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_glass_sphere_is_tessellated() {
        let scene = cornell_box(&RenderSettings::default(), 4, 4).unwrap();
        let ray = Ray3f::new(Vector3f::new(2.0, 1.5, 8.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.ray_intersection(&ray).unwrap();
        assert_eq!(hit.material_id, 5);
        assert!((hit.point.z - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_lens_settings_reach_camera() {
        let pinhole = cornell_box(&RenderSettings::default(), 4, 4).unwrap();
        let lens = cornell_box(&RenderSettings { lens_radius: 0.5, ..RenderSettings::default() }, 4, 4).unwrap();
        let eye = Vector3f::new(0.0, 5.0, 10.5);
        let mut moved = 0;
        for seed in 0..8 {
            let mut sampler = LcgRng::new(seed);
            assert!((pinhole.camera().generate_ray(5, &mut sampler).origin() - eye).norm() < 1e-6);
            let mut sampler = LcgRng::new(seed);
            let origin = lens.camera().generate_ray(5, &mut sampler).origin();
            assert!((origin - eye).norm() <= 0.5 + 1e-5);
            if (origin - eye).norm() > 1e-4 {
                moved += 1;
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn test_light_is_visible_from_floor() {
        let scene = cornell_box(&RenderSettings::default(), 4, 4).unwrap();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.5, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        let hit = scene.ray_intersection(&ray).unwrap();
        assert!(scene.materials()[hit.material_id].is_emissive());
        assert!((hit.point.y - 9.85).abs() < 1e-3);
    }
}
