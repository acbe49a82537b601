// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Closest-hit record for one ray, consumed by shading in the same bounce.
///
/// `surface_normal` is the outward geometric (or interpolated) normal; it is
/// not flipped toward the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeableIntersection {
    pub t: Float,
    pub point: Vector3f,
    pub surface_normal: Vector3f,
    pub material_id: usize,
    pub uv: Vector2f,
}

impl ShadeableIntersection {
    pub fn new(t: Float,
               point: Vector3f,
               surface_normal: Vector3f,
               material_id: usize,
               uv: Vector2f) -> Self {
        Self { t, point, surface_normal, material_id, uv }
    }
}

/// Geometry-only hit returned by shape tests before a material is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub t: Float,
    pub normal: Vector3f,
    pub uv: Vector2f,
}

impl SurfaceHit {
    pub fn new(t: Float, normal: Vector3f, uv: Vector2f) -> Self {
        Self { t, normal, uv }
    }
}
