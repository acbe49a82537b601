// Copyright @yucwang 2026

use super::constants::{Float, ONE_MINUS_EPSILON};

/// Piecewise-constant 1D distribution over `[0, 1)` built from `n` weights.
///
/// `cdf` has `n + 1` entries, starts at 0 and ends at 1. When every weight is
/// zero the CDF is the uniform ramp `i / n` so sampling stays well defined,
/// while the reported pdf is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution1D {
    func: Vec<Float>,
    cdf: Vec<Float>,
    func_int: Float,
}

impl Distribution1D {
    pub fn new(values: &[Float]) -> Self {
        let func = values.to_vec();
        let n = func.len();
        let mut cdf = vec![0.0; n + 1];
        for i in 1..(n + 1) {
            cdf[i] = cdf[i - 1] + func[i - 1] / n as Float;
        }

        let func_int = cdf[n];
        if func_int == 0.0 {
            for i in 1..(n + 1) {
                cdf[i] = i as Float / n as Float;
            }
        } else {
            for i in 1..(n + 1) {
                cdf[i] /= func_int;
            }
        }

        Self { func, cdf, func_int }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    pub fn func(&self) -> &[Float] {
        &self.func
    }

    pub fn cdf(&self) -> &[Float] {
        &self.cdf
    }

    /// Integral of the input weights before normalization.
    pub fn func_int(&self) -> Float {
        self.func_int
    }

    /// Probability of drawing bucket `index` from `sample_discrete`.
    pub fn pdf_discrete(&self, index: usize) -> Float {
        if self.func_int == 0.0 || index >= self.count() {
            return 0.0;
        }
        self.func[index] / (self.func_int * self.count() as Float)
    }

    /// Returns `(x, pdf)` with `x` in `[0, 1)` and `pdf` the density at `x`.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float) {
        if self.func.is_empty() {
            return (0.0, 0.0);
        }

        let u = clamp_unit(u);
        let offset = self.find_interval(u);
        let pdf = self.density(offset);

        let mut du = u - self.cdf[offset];
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        } else {
            du = 0.0;
        }

        (((offset as Float + du) / self.count() as Float).min(ONE_MINUS_EPSILON), pdf)
    }

    /// Returns `(index, pdf)` where `pdf` is `func[index] / func_int`.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float) {
        if self.func.is_empty() {
            return (0, 0.0);
        }

        let offset = self.find_interval(clamp_unit(u));
        (offset, self.density(offset))
    }

    fn density(&self, offset: usize) -> Float {
        if self.func_int == 0.0 {
            0.0
        } else {
            self.func[offset] / self.func_int
        }
    }

    // Largest `offset` in [0, n-1] with cdf[offset] <= u, found as the first
    // index whose cdf strictly exceeds u, minus one.
    fn find_interval(&self, u: Float) -> usize {
        let mut left = 0usize;
        let mut right = self.cdf.len() - 1;
        while right > left {
            let mid = (left + right) / 2;
            if self.cdf[mid] <= u {
                left = mid + 1;
            } else {
                right = mid;
            }
        }

        right.saturating_sub(1).min(self.cdf.len() - 2)
    }
}

fn clamp_unit(u: Float) -> Float {
    if u.is_nan() {
        0.0
    } else {
        u.clamp(0.0, ONE_MINUS_EPSILON)
    }
}
