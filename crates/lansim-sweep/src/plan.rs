//! Experiment plans: the grid of configurations a sweep will run.

use anyhow::Context;
use lansim_core::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A sweep plan: lists to cross-multiply plus the channel constants
/// shared by every run.
///
/// Loadable from TOML; omitted fields fall back to the default
/// experiment grid (5 station counts x 3 arrival rates x both
/// persistence modes over a 1 Mb/s bus).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepPlan {
    pub station_counts: Vec<usize>,
    pub arrival_rates: Vec<f64>,
    pub persistence_modes: Vec<bool>,
    pub transmission_rate: f64,
    pub packet_length: f64,
    pub station_spacing: f64,
    pub propagation_speed: f64,
    pub horizon: f64,
    /// Base seed; each run derives its own stream from this and its
    /// position in the grid.
    pub seed: u64,
}

impl Default for SweepPlan {
    fn default() -> Self {
        SweepPlan {
            station_counts: vec![100, 80, 60, 40, 20],
            arrival_rates: vec![20.0, 10.0, 7.0],
            persistence_modes: vec![true, false],
            transmission_rate: 1e6,
            packet_length: 1500.0,
            station_spacing: 10.0,
            propagation_speed: 2e8,
            horizon: 1000.0,
            seed: 0,
        }
    }
}

impl SweepPlan {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading sweep plan {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing sweep plan {}", path.display()))
    }

    /// Cross-product of the grid, one `SimConfig` per run, each with a
    /// seed derived from the base seed and the run's grid position.
    pub fn expand(&self) -> Vec<SimConfig> {
        let mut configs = Vec::new();
        for &persistent in &self.persistence_modes {
            for &arrival_rate in &self.arrival_rates {
                for &stations in &self.station_counts {
                    let index = configs.len() as u64;
                    configs.push(SimConfig {
                        stations,
                        arrival_rate,
                        transmission_rate: self.transmission_rate,
                        packet_length: self.packet_length,
                        station_spacing: self.station_spacing,
                        propagation_speed: self.propagation_speed,
                        horizon: self.horizon,
                        persistent,
                        seed: self.seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
                    });
                }
            }
        }
        configs
    }
}
