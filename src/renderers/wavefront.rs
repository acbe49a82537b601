// Copyright @yucwang 2026

use crate::core::interaction::ShadeableIntersection;
use crate::core::scene::Scene;
use crate::core::settings::{HemisphereSampling, RenderSettings};
use crate::integrators::compaction::{compact_paths, sort_by_material};
use crate::integrators::path::{bounce_sampler, camera_sampler, PathSegment, PathShader};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

use rayon::prelude::*;
use std::time::Instant;

use super::renderer::iteration_progress;
pub use super::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationStats {
    /// Bounce steps until the pool emptied.
    pub bounces: u32,
    /// Sum of pool sizes over all bounce steps.
    pub segments_traced: usize,
}

/// Breadth-first path tracer: every pixel's path advances one bounce at a
/// time across the whole pool, and finished paths are compacted away after
/// each bounce.
pub struct WavefrontRenderer {
    seed: u64,
    sort_by_material: bool,
    hemisphere: HemisphereSampling,
    background: Vector3f,
    show_progress: bool,
}

impl WavefrontRenderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            seed: settings.seed,
            sort_by_material: settings.sort_by_material,
            hemisphere: settings.hemisphere,
            background: settings.background,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// One sample per pixel, run to exhaustion and added to `accumulator`.
    /// Callers may stop between iterations and keep the partial sum.
    pub fn render_iteration(&self, scene: &Scene, iteration: u32, accumulator: &mut Bitmap) -> IterationStats {
        let camera = scene.camera();
        let trace_depth = scene.state().trace_depth;
        let shader = PathShader::new(scene.materials(), self.hemisphere).with_background(self.background);

        let mut paths: Vec<PathSegment> = (0..camera.pixel_count())
            .into_par_iter()
            .map(|pixel_index| {
                let mut sampler = camera_sampler(self.seed, iteration, pixel_index);
                PathSegment::new(camera.generate_ray(pixel_index, &mut sampler), pixel_index, trace_depth)
            })
            .collect();

        let mut stats = IterationStats::default();
        while !paths.is_empty() {
            let mut hits: Vec<Option<ShadeableIntersection>> =
                paths.par_iter().map(|path| scene.ray_intersection(&path.ray)).collect();

            if self.sort_by_material {
                let mut pairs: Vec<(PathSegment, Option<ShadeableIntersection>)> =
                    paths.into_iter().zip(hits).collect();
                sort_by_material(&mut pairs);
                (paths, hits) = pairs.into_iter().unzip();
            }

            let bounce = stats.bounces;
            paths.par_iter_mut().zip(hits.par_iter()).for_each(|(path, hit)| {
                let mut sampler = bounce_sampler(self.seed, iteration, path.pixel_index, bounce);
                shader.shade(path, hit.as_ref(), &mut sampler);
            });

            stats.bounces += 1;
            stats.segments_traced += paths.len();

            let (active, finished) = compact_paths(paths);
            for path in &finished {
                accumulator.accumulate(path.pixel_index, &path.radiance);
            }
            paths = active;
        }

        log::debug!("iteration {}: {} bounces, {} segments", iteration, stats.bounces, stats.segments_traced);
        stats
    }
}

impl Renderer for WavefrontRenderer {
    fn render(&self, scene: &Scene) -> Bitmap {
        let state = scene.state();
        let mut accumulator = Bitmap::new(state.camera.width(), state.camera.height());
        if state.iterations == 0 {
            return accumulator;
        }

        let progress = iteration_progress(state.iterations, self.show_progress);

        let start = Instant::now();
        let mut segments = 0usize;
        for iteration in 0..state.iterations {
            segments += self.render_iteration(scene, iteration, &mut accumulator).segments_traced;
            progress.inc(1);
        }
        progress.finish_and_clear();

        let elapsed = start.elapsed();
        log::info!("Rendered {} iterations of {}x{} in {:.2?} ({:.2} M segments/s).",
                   state.iterations,
                   state.camera.width(),
                   state.camera.height(),
                   elapsed,
                   segments as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6);

        accumulator.scaled(1.0 / state.iterations as Float)
    }
}
