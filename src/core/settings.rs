// Copyright @yucwang 2026

use clap::ValueEnum;

use crate::accel::{AccelKind, BuildOptions, SplitMethod};
use crate::core::error::{MilleError, Result};
use crate::math::constants::{Float, Vector3f};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HemisphereSampling {
    /// sqrt(u) latitude mapping.
    Cosine,
    /// Concentric disk lifted to the hemisphere; lower discrepancy.
    Concentric,
}

/// Knobs for one render. Defaults match the demo scene.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub iterations: u32,
    pub trace_depth: u32,
    pub seed: u64,
    pub accel: AccelKind,
    pub split_method: SplitMethod,
    pub max_leaf_size: usize,
    pub octree_max_depth: u32,
    pub sort_by_material: bool,
    pub hemisphere: HemisphereSampling,
    /// Radiance returned to paths that leave the scene.
    pub background: Vector3f,
    /// Thin-lens aperture radius; 0 keeps a pinhole camera.
    pub lens_radius: Float,
    /// Distance from the camera to the plane in focus.
    pub focal_distance: Float,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            iterations: 64,
            trace_depth: 8,
            seed: 0,
            accel: AccelKind::FlatBvh,
            split_method: SplitMethod::Midpoint,
            max_leaf_size: 2,
            octree_max_depth: 8,
            sort_by_material: false,
            hemisphere: HemisphereSampling::Cosine,
            background: Vector3f::zeros(),
            lens_radius: 0.0,
            focal_distance: 10.5,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<()> {
        if self.trace_depth == 0 {
            return Err(MilleError::InvalidSettings(String::from("trace depth must be at least 1")));
        }
        if self.max_leaf_size == 0 {
            return Err(MilleError::InvalidSettings(String::from("leaf size must be at least 1")));
        }
        if self.background.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(MilleError::InvalidSettings(String::from("background must be finite and non-negative")));
        }
        let bad_radius = self.lens_radius.is_nan() || self.lens_radius < 0.0;
        if bad_radius || (self.lens_radius > 0.0 && (self.focal_distance.is_nan() || self.focal_distance <= 0.0)) {
            return Err(MilleError::InvalidSettings(String::from("thin lens needs a non-negative radius and positive focal distance")));
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_leaf_size: self.max_leaf_size,
            split_method: self.split_method,
            octree_max_depth: self.octree_max_depth,
        }
    }
}
