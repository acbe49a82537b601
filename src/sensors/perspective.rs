// Copyright @yucwang 2026

use crate::core::rng::Sampler;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_disk_concentric;

/// Pinhole camera with an optional thin lens. Pixel `(0, 0)` is the top-left
/// corner; rays are jittered within their pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    width: usize,
    height: usize,
    position: Vector3f,
    view: Vector3f,
    up: Vector3f,
    right: Vector3f,
    pixel_length: Vector2f,
    lens_radius: Float,
    focal_distance: Float,
}

impl PerspectiveCamera {
    pub fn new(width: usize,
               height: usize,
               position: Vector3f,
               look_at: Vector3f,
               up: Vector3f,
               fov_y_degrees: Float) -> Self {
        let view = (look_at - position).normalize();
        let right = view.cross(&up).normalize();
        let up = right.cross(&view).normalize();

        let y_scaled = (0.5 * fov_y_degrees).to_radians().tan();
        let x_scaled = y_scaled * width as Float / height.max(1) as Float;
        let pixel_length = Vector2f::new(2.0 * x_scaled / width.max(1) as Float,
                                         2.0 * y_scaled / height.max(1) as Float);

        Self {
            width,
            height,
            position,
            view,
            up,
            right,
            pixel_length,
            lens_radius: 0.0,
            focal_distance: 1.0,
        }
    }

    pub fn with_lens(mut self, lens_radius: Float, focal_distance: Float) -> Self {
        self.lens_radius = lens_radius.max(0.0);
        self.focal_distance = focal_distance;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Primary ray through row-major pixel `pixel_index`.
    pub fn generate_ray<S: Sampler>(&self, pixel_index: usize, sampler: &mut S) -> Ray3f {
        let x = (pixel_index % self.width.max(1)) as Float;
        let y = (pixel_index / self.width.max(1)) as Float;
        let jitter = sampler.next_2d();

        let dir = (self.view
            + self.right * self.pixel_length.x * (x + jitter.x - 0.5 * self.width as Float)
            - self.up * self.pixel_length.y * (y + jitter.y - 0.5 * self.height as Float))
            .normalize();

        if self.lens_radius <= 0.0 {
            return Ray3f::new(self.position, dir, None, None);
        }

        let lens = sample_uniform_disk_concentric(&sampler.next_2d()) * self.lens_radius;
        let focus = self.position + dir * (self.focal_distance / dir.dot(&self.view));
        let origin = self.position + self.right * lens.x + self.up * lens.y;
        Ray3f::new(origin, focus - origin, None, None)
    }
}
