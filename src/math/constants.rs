/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = 3.14159265359;
pub const TWO_PI: Float = 6.28318530718;
pub const SQRT_OF_ONE_THIRD: Float = 0.57735026919;

pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;
/// Largest float below 1.
pub const ONE_MINUS_EPSILON: Float = 0.99999994;

// Offset applied along a continued ray to step off the surface it left.
pub const RAY_OFFSET: Float = 1e-3;
