// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// Source of uniform numbers in `[0, 1)` consumed by the samplers.
pub trait Sampler {
    fn next_f32(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_f32();
        let y = self.next_f32();
        Vector2f::new(x, y)
    }
}

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Stream for one lane: distinct `(iteration, pixel, bounce)` keys give
    /// statistically independent sequences under the same render seed.
    pub fn for_lane(seed: u64, iteration: u32, pixel_index: usize, bounce: u32) -> Self {
        let key = mix64(seed)
            ^ mix64(((iteration as u64) << 32) | bounce as u64)
            ^ mix64((pixel_index as u64).wrapping_add(0x9E3779B97F4A7C15));
        Self::new(mix64(key))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }
}

impl Sampler for LcgRng {
    fn next_f32(&mut self) -> Float {
        // 24 high bits keep the result strictly below 1.0.
        (self.next_u32() >> 8) as Float * (1.0 / 16777216.0)
    }
}

// splitmix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
