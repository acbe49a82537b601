// Copyright @yucwang 2026

use super::scatter::scatter_ray;

use crate::core::interaction::ShadeableIntersection;
use crate::core::rng::{LcgRng, Sampler};
use crate::core::scene::Scene;
use crate::core::settings::HemisphereSampling;
use crate::materials::material::Material;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;

/// One in-flight light path. Active while `remaining_bounces > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub ray: Ray3f,
    pub throughput: Vector3f,
    pub radiance: Vector3f,
    pub pixel_index: usize,
    pub remaining_bounces: u32,
}

impl PathSegment {
    pub fn new(ray: Ray3f, pixel_index: usize, trace_depth: u32) -> Self {
        Self {
            ray,
            throughput: Vector3f::new(1.0, 1.0, 1.0),
            radiance: Vector3f::zeros(),
            pixel_index,
            remaining_bounces: trace_depth,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_bounces > 0
    }

    pub fn terminate(&mut self) {
        self.remaining_bounces = 0;
    }
}

/// What happened to a path during one shading step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    /// Left the scene; background radiance was added.
    Missed,
    /// Reached a light; its emission was added.
    Emitted,
    /// Continued with a new ray.
    Scattered,
    /// Killed by Russian roulette, ran out of bounces, or had no material.
    Absorbed,
    /// Was already terminated; left untouched.
    Inactive,
}

// Lane 0 of every (iteration, pixel) stream drives the camera, bounce `b` uses lane `b + 1`.
pub fn camera_sampler(seed: u64, iteration: u32, pixel_index: usize) -> LcgRng {
    LcgRng::for_lane(seed, iteration, pixel_index, 0)
}

pub fn bounce_sampler(seed: u64, iteration: u32, pixel_index: usize, bounce: u32) -> LcgRng {
    LcgRng::for_lane(seed, iteration, pixel_index, bounce.saturating_add(1))
}

/// Per-bounce shading: a pure function of the path, its hit, and the material table.
pub struct PathShader<'a> {
    materials: &'a [Material],
    hemisphere: HemisphereSampling,
    background: Vector3f,
}

impl<'a> PathShader<'a> {
    pub fn new(materials: &'a [Material], hemisphere: HemisphereSampling) -> Self {
        Self { materials, hemisphere, background: Vector3f::zeros() }
    }

    pub fn with_background(mut self, background: Vector3f) -> Self {
        self.background = background;
        self
    }

    pub fn shade<S: Sampler>(&self,
                             path: &mut PathSegment,
                             hit: Option<&ShadeableIntersection>,
                             sampler: &mut S) -> PathEvent {
        if !path.is_active() {
            return PathEvent::Inactive;
        }

        let hit = match hit {
            Some(hit) => hit,
            None => {
                path.radiance += path.throughput.component_mul(&self.background);
                path.terminate();
                return PathEvent::Missed;
            }
        };

        let material = match self.materials.get(hit.material_id) {
            Some(material) => material,
            None => {
                path.terminate();
                return PathEvent::Absorbed;
            }
        };

        if material.is_emissive() {
            path.radiance += path.throughput.component_mul(&material.emitted());
            path.terminate();
            return PathEvent::Emitted;
        }

        scatter_ray(path, &hit.point, &hit.surface_normal, material, self.hemisphere, sampler);
        if !path.is_active() {
            return PathEvent::Absorbed;
        }

        path.remaining_bounces -= 1;
        if path.is_active() { PathEvent::Scattered } else { PathEvent::Absorbed }
    }
}

/// Follows one path to termination on the calling thread, drawing the same
/// random streams as the wavefront renderer.
pub fn trace_path(scene: &Scene,
                  shader: &PathShader,
                  mut path: PathSegment,
                  seed: u64,
                  iteration: u32,
                  trace_depth: u32) -> Vector3f {
    while path.is_active() {
        let bounce = trace_depth.saturating_sub(path.remaining_bounces);
        let hit = scene.ray_intersection(&path.ray);
        let mut sampler = bounce_sampler(seed, iteration, path.pixel_index, bounce);
        shader.shade(&mut path, hit.as_ref(), &mut sampler);
    }
    path.radiance
}
