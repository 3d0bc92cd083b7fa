//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! All randomness flows through a SeededRng built from the run's seed.
//!
//! Draws are consumed in a fixed order by the generator, so the same
//! seed always yields the same table.

use crate::{
    error::{PipelineError, PipelineResult},
    types::Seed,
};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Poisson};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct SeededRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: Seed) -> Self {
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// `count` draws from Normal(mean, std_dev).
    /// `std_dev` must be finite and non-negative.
    pub fn normal_draws(&mut self, mean: f64, std_dev: f64, count: usize) -> PipelineResult<Vec<f64>> {
        // rand_distr accepts a negative std_dev and mirrors the draws.
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(PipelineError::Distribution(format!(
                "normal(mean={mean}, std_dev={std_dev}): std_dev must be finite and non-negative"
            )));
        }
        let normal = Normal::new(mean, std_dev).map_err(|e| {
            PipelineError::Distribution(format!("normal(mean={mean}, std_dev={std_dev}): {e}"))
        })?;
        Ok((0..count).map(|_| normal.sample(&mut self.inner)).collect())
    }

    /// `count` draws from Poisson(mean), returned as whole counts.
    pub fn poisson_draws(&mut self, mean: f64, count: usize) -> PipelineResult<Vec<u64>> {
        let poisson = Poisson::new(mean).map_err(|e| {
            PipelineError::Distribution(format!("poisson(mean={mean}): {e}"))
        })?;
        // Poisson<f64> yields integral floats; the cast is exact below 2^53.
        Ok((0..count).map(|_| poisson.sample(&mut self.inner) as u64).collect())
    }
}
