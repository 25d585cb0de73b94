//! Specifies some logic to work with noise.

use crate::utils::Random;
use std::sync::Arc;

/// Provides way to generate some noise to floating point value.
#[derive(Clone)]
pub struct Noise {
    probability: f64,
    range: (f64, f64),
    random: Arc<dyn Random>,
}

impl Noise {
    /// Creates a new instance of `Noise` which will change the target value with given probability
    /// using a ratio sampled from range: `value = value * sample_from(range)`.
    pub fn new_with_ratio(probability: f64, range: (f64, f64), random: Arc<dyn Random>) -> Self {
        Self { probability, range, random }
    }

    /// Generate some noise based on given value.
    pub fn generate(&self, value: f64) -> f64 {
        if self.random.is_hit(self.probability) {
            // NOTE a zero value cannot be scaled, so a sample is used as is
            if value == 0. {
                self.random.uniform_real(self.range.0, self.range.1)
            } else {
                value * self.random.uniform_real(self.range.0, self.range.1)
            }
        } else {
            value
        }
    }
}
