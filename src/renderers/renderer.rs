// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};

pub trait Renderer {
    /// Runs every iteration of the scene's render state and returns the
    /// averaged radiance estimate.
    fn render(&self, scene: &Scene) -> Bitmap;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Advance every pixel's path one bounce at a time, compacting between bounces.
    Wavefront,
    /// Trace each path to termination on its own.
    Sequential,
}

/// Iteration bar shared by the renderers; hidden when `visible` is false.
pub(crate) fn iteration_progress(iterations: u32, visible: bool) -> ProgressBar {
    let progress = if visible {
        ProgressBar::new(iterations as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}
