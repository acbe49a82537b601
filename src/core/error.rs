// Copyright @yucwang 2026

use thiserror::Error;

/// Failures detected while assembling a scene or writing results.
///
/// The tracing core itself never fails: degenerate inputs fall back to
/// well-defined behavior instead.
#[derive(Debug, Error)]
pub enum MilleError {
    #[error("geometry {geom} references unknown material {material}")]
    UnknownMaterial { geom: usize, material: usize },

    #[error("geometry {geom} references unknown mesh {mesh}")]
    UnknownMesh { geom: usize, mesh: usize },

    #[error("invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("scene has no camera")]
    MissingCamera,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("exr encoding failed: {0}")]
    Exr(#[from] exr::error::Error),
}

pub type Result<T> = std::result::Result<T, MilleError>;
