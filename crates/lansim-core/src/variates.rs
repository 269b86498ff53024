//! Random variate generation for the simulator.
//!
//! Wraps a seeded [`StdRng`] behind the two draws the model needs:
//! exponential inter-arrival gaps (inverse-CDF transform) and uniform
//! backoff slot counts. Seeding is injectable so runs and tests are
//! reproducible; the engine owns exactly one `Variates` per run.

use rand::rngs::StdRng;
use rand::RngExt as _;
use rand::SeedableRng;

/// Seeded source of the simulator's random draws.
#[derive(Debug)]
pub struct Variates {
    rng: StdRng,
}

impl Variates {
    /// Deterministic source for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible source seeded from the operating system.
    pub fn from_os_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Exponential sample with the given rate: `-ln(1 - U) / rate`,
    /// `U` uniform on `[0, 1)`.
    ///
    /// A non-positive rate is a configuration error and is rejected by
    /// [`SimConfig::validate`](crate::config::SimConfig::validate)
    /// before any run starts; this only debug-asserts.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        debug_assert!(rate > 0.0, "exponential rate must be positive");
        let u: f64 = self.rng.random();
        -(1.0 - u).ln() / rate
    }

    /// Uniform slot count on `[0, 2^stage - 1]` for truncated binary
    /// exponential backoff. `stage` must be at least 1.
    pub fn backoff_slots(&mut self, stage: u32) -> u64 {
        debug_assert!((1..=63).contains(&stage), "backoff stage out of range");
        let max = (1u64 << stage) - 1;
        self.rng.random_range(0..=max)
    }
}
