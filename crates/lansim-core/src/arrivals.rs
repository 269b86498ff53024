//! Poisson arrival sequence generation.
//!
//! Each station's entire packet backlog is generated up front: a FIFO
//! of packet-ready timestamps spanning the simulation horizon. The
//! sequence only ever shrinks from the front during a run.

use crate::variates::Variates;
use std::collections::VecDeque;

/// Generate one station's packet-ready timestamps.
///
/// Accumulates exponential inter-arrival gaps at `rate` and keeps the
/// running clock values strictly below `horizon`; the first sample to
/// land past the horizon is discarded and generation stops. The result
/// is empty when even the first gap overshoots.
pub fn generate(vars: &mut Variates, rate: f64, horizon: f64) -> VecDeque<f64> {
    let mut timestamps = VecDeque::new();
    let mut clock = 0.0;

    loop {
        clock += vars.exponential(rate);
        if clock >= horizon {
            break;
        }
        timestamps.push_back(clock);
    }

    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_increasing_and_within_horizon() {
        let mut vars = Variates::from_seed(5);
        let horizon = 100.0;
        let arrivals = generate(&mut vars, 20.0, horizon);

        assert!(!arrivals.is_empty());
        let mut prev = 0.0;
        for &t in &arrivals {
            assert!(t > prev);
            assert!(t < horizon);
            prev = t;
        }
    }

    #[test]
    fn count_tracks_rate_times_horizon() {
        let mut vars = Variates::from_seed(9);
        let arrivals = generate(&mut vars, 50.0, 200.0);
        // Poisson with mean 10_000; a 5% band is ~16 standard deviations.
        let n = arrivals.len() as f64;
        assert!((n - 10_000.0).abs() < 500.0, "got {n} arrivals");
    }

    #[test]
    fn empty_when_horizon_is_tiny() {
        let mut vars = Variates::from_seed(2);
        // Mean gap is 10 s against a 1 µs horizon.
        let arrivals = generate(&mut vars, 0.1, 1e-6);
        assert!(arrivals.is_empty());
    }
}
