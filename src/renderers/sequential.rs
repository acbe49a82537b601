// Copyright @yucwang 2026

use crate::core::scene::Scene;
use crate::core::settings::{HemisphereSampling, RenderSettings};
use crate::integrators::path::{camera_sampler, trace_path, PathSegment, PathShader};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

use rayon::prelude::*;
use std::time::Instant;

use super::renderer::iteration_progress;
pub use super::renderer::Renderer;

/// Depth-first renderer: each pixel's path runs to termination on one
/// thread. Draws the same random streams as `WavefrontRenderer`, so both
/// produce the same image for the same seed.
pub struct SequentialRenderer {
    seed: u64,
    hemisphere: HemisphereSampling,
    background: Vector3f,
    show_progress: bool,
}

impl SequentialRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            seed: settings.seed,
            hemisphere: settings.hemisphere,
            background: settings.background,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Renderer for SequentialRenderer {
    fn render(&self, scene: &Scene) -> Bitmap {
        let state = scene.state();
        let camera = &state.camera;
        let mut accumulator = Bitmap::new(camera.width(), camera.height());
        if state.iterations == 0 {
            return accumulator;
        }

        let shader = PathShader::new(scene.materials(), self.hemisphere).with_background(self.background);
        let progress = iteration_progress(state.iterations, self.show_progress);
        let start = Instant::now();
        for iteration in 0..state.iterations {
            let radiance: Vec<Vector3f> = (0..camera.pixel_count())
                .into_par_iter()
                .map(|pixel_index| {
                    let mut sampler = camera_sampler(self.seed, iteration, pixel_index);
                    let path = PathSegment::new(camera.generate_ray(pixel_index, &mut sampler), pixel_index, state.trace_depth);
                    trace_path(scene, &shader, path, self.seed, iteration, state.trace_depth)
                })
                .collect();
            for (pixel_index, color) in radiance.iter().enumerate() {
                accumulator.accumulate(pixel_index, color);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        log::info!("Rendered {} iterations of {}x{} sequentially in {:.2?}.",
                   state.iterations, camera.width(), camera.height(), start.elapsed());

        accumulator.scaled(1.0 / state.iterations as Float)
    }
}
