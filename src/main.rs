// Copyright 2020 TwoCookingMice

use clap::Parser;

use mille::accel::{AccelKind, SplitMethod};
use mille::core::error::Result;
use mille::core::settings::{HemisphereSampling, RenderSettings};
use mille::io::image_utils;
use mille::math::constants::Vector3f;
use mille::renderers::renderer::{Renderer, RendererKind};
use mille::renderers::sequential::SequentialRenderer;
use mille::renderers::wavefront::WavefrontRenderer;
use mille::scenes::cornell::cornell_box;

use std::path::PathBuf;

/// Renders the built-in Cornell box with the wavefront path tracer.
#[derive(Debug, Parser)]
#[command(name = "mille", version)]
struct Cli {
    /// Output image; `.png` is clamped 8-bit, anything else is written as EXR.
    /// Defaults to `<scene name>.exr`.
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 256)]
    width: usize,

    #[arg(long, default_value_t = 256)]
    height: usize,

    /// Samples per pixel.
    #[arg(long = "spp", default_value_t = 64)]
    iterations: u32,

    #[arg(long = "max-depth", default_value_t = 8)]
    trace_depth: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = AccelKind::FlatBvh)]
    accel: AccelKind,

    #[arg(long, value_enum, default_value_t = SplitMethod::Midpoint)]
    split: SplitMethod,

    #[arg(long, default_value_t = 2)]
    leaf_size: usize,

    #[arg(long, default_value_t = 8)]
    octree_depth: u32,

    /// Group paths by material before shading each bounce.
    #[arg(long)]
    sort_by_material: bool,

    #[arg(long, value_enum, default_value_t = HemisphereSampling::Cosine)]
    hemisphere: HemisphereSampling,

    /// Radiance seen by rays that leave the scene.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], default_values_t = [0.0, 0.0, 0.0])]
    background: Vec<f32>,

    /// Thin-lens aperture radius; 0 renders with a pinhole.
    #[arg(long, default_value_t = 0.0)]
    lens_radius: f32,

    #[arg(long, default_value_t = 10.5)]
    focal_distance: f32,

    #[arg(long, value_enum, default_value_t = RendererKind::Wavefront)]
    renderer: RendererKind,
}

impl Cli {
    fn settings(&self) -> RenderSettings {
        RenderSettings {
            iterations: self.iterations,
            trace_depth: self.trace_depth,
            seed: self.seed,
            accel: self.accel,
            split_method: self.split,
            max_leaf_size: self.leaf_size,
            octree_max_depth: self.octree_depth,
            sort_by_material: self.sort_by_material,
            hemisphere: self.hemisphere,
            background: match self.background.as_slice() {
                [r, g, b] => Vector3f::new(*r, *g, *b),
                _ => Vector3f::zeros(),
            },
            lens_radius: self.lens_radius,
            focal_distance: self.focal_distance,
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings();
    log::info!("Settings: {:?}", settings);

    let scene = cornell_box(&settings, cli.width, cli.height)?;
    let renderer: Box<dyn Renderer> = match cli.renderer {
        RendererKind::Wavefront => Box::new(WavefrontRenderer::new(&settings).with_progress(true)),
        RendererKind::Sequential => Box::new(SequentialRenderer::new(&settings).with_progress(true)),
    };
    let image = renderer.render(&scene);

    let output = cli.output.clone().unwrap_or_else(|| scene.state().default_output());
    let written = image_utils::write_image(&image, &output)?;
    log::info!("Image written to: {}.", written.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
