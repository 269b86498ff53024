//! Reduction of run counters into the published metrics.

use crate::config::SimConfig;
use serde::{Deserialize, Serialize};

/// Raw counters accumulated by one engine run.
///
/// A packet dropped after exhausting its backoff stages vanishes from
/// both counters; the published efficiency and throughput formulas
/// deliberately do not see drops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Transmission attempts, counting every party to a collision.
    pub attempts: u64,
    /// Attempts that completed without a collision.
    pub successes: u64,
}

/// Result record for one (station count, arrival rate, persistence
/// mode) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub persistent: bool,
    pub arrival_rate: f64,
    pub stations: usize,
    /// Fraction of attempts that succeeded; NaN when no station ever
    /// attempted before the horizon.
    pub efficiency: f64,
    /// Successfully delivered bits per simulated second, in Mbps.
    pub throughput_mbps: f64,
}

impl MetricsRecord {
    pub fn from_counters(cfg: &SimConfig, counters: RunCounters) -> Self {
        let efficiency = if counters.attempts == 0 {
            f64::NAN
        } else {
            counters.successes as f64 / counters.attempts as f64
        };
        let throughput_mbps =
            counters.successes as f64 * cfg.packet_length / (cfg.horizon * 1e6);

        MetricsRecord {
            persistent: cfg.persistent,
            arrival_rate: cfg.arrival_rate,
            stations: cfg.stations,
            efficiency,
            throughput_mbps,
        }
    }
}
