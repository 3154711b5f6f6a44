//! Seeded pseudo-random stream and the primitive draws every sampler builds on.
//!
//! A stream is a ChaCha8 generator keyed by a signed 64-bit seed. All derived
//! values (ranges, floats, weighted picks) are computed from `next_u64` with
//! fixed arithmetic, so the same seed yields the same sequence on every
//! platform.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

const UNIT_FLOAT_SCALE: f64 = 1.0 / ((1_u64 << 53) as f64);

#[derive(Clone, Debug)]
pub struct SeededStream {
    seed: i64,
    rng: ChaCha8Rng,
}

impl SeededStream {
    pub fn new(seed: i64) -> Self {
        Self { seed, rng: ChaCha8Rng::seed_from_u64(seed as u64) }
    }

    /// The seed this stream was created from.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    pub fn next_i64(&mut self) -> i64 {
        self.next_u64() as i64
    }

    /// Uniform integer in `min..=max`. Returns `min` without drawing when `min >= max`.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = (i128::from(max) - i128::from(min) + 1) as u128;
        let offset = u128::from(self.next_u64()) % span;
        (i128::from(min) + offset as i128) as i64
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn unit_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * UNIT_FLOAT_SCALE
    }

    /// Uniform float in `[min, max)`. Returns `min` without drawing when `min >= max`.
    pub fn float_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        min + self.unit_f64() * (max - min)
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit_f64() < probability
    }

    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.int_range(0, len as i64 - 1) as usize)
    }

    /// Picks an index proportionally to `weights`, scanning them in slice order.
    ///
    /// Negative and non-finite weights count as zero one by one, so they never
    /// cancel out a positive neighbour: `[5.0, -3.0]` always picks index 0.
    /// Returns `None` without drawing when the total weight is not positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().copied().map(usable_weight).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let target = self.unit_f64() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            let weight = usable_weight(weight);
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_positive = Some(index);
            if target < cumulative {
                return Some(index);
            }
        }
        last_positive
    }
}

fn usable_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 { weight } else { 0.0 }
}
