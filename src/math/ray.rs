// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, FLOAT_MAX, RAY_OFFSET};

/// Ray with a live segment `[min_t, max_t]`. Closest-hit searches shrink
/// `max_t` as they find nearer surfaces, so later tests can cull against it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(FLOAT_MAX)}
    }

    /// Ray leaving a surface at `point`, nudged along `dir` so it does not
    /// re-hit the surface it starts on.
    pub fn continued(point: &Vector3f, dir: &Vector3f) -> Self {
        let dir = dir.normalize();
        Self { origin: point + dir * RAY_OFFSET, dir, min_t: 0.0, max_t: FLOAT_MAX }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    /// Ends the segment at `t` if `t` lies in it and is strictly nearer than
    /// the current end. Returns whether the segment changed.
    pub fn shrink_to(&mut self, t: Float) -> bool {
        if t < self.min_t || t >= self.max_t {
            return false;
        }
        self.max_t = t;
        true
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }
}
