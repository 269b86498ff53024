//! Per-run configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration, fatal to that run only.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive and finite (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("station count must be non-zero")]
    NoStations,
}

/// Parameters for a single contention-engine run.
///
/// Stations sit on a straight bus at `station_spacing` intervals, so
/// the propagation delay between two stations is proportional to their
/// id distance. All packets are `packet_length` bits long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of stations on the bus.
    pub stations: usize,
    /// Mean packet arrival rate per station (packets/s).
    pub arrival_rate: f64,
    /// Bus bit rate (bit/s).
    pub transmission_rate: f64,
    /// Fixed packet length (bits).
    pub packet_length: f64,
    /// Distance between adjacent stations (m).
    pub station_spacing: f64,
    /// Signal propagation speed on the medium (m/s).
    pub propagation_speed: f64,
    /// Simulated time horizon (s).
    pub horizon: f64,
    /// Carrier-sense policy: persistent stations wait exactly until
    /// the channel frees; non-persistent stations re-draw a random
    /// deferral while it is busy.
    pub persistent: bool,
    /// Seed for the run's private random stream.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            stations: 20,
            arrival_rate: 7.0,
            transmission_rate: 1e6,
            packet_length: 1500.0,
            station_spacing: 10.0,
            propagation_speed: 2e8,
            horizon: 1000.0,
            persistent: true,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Reject non-positive or non-finite parameters before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations == 0 {
            return Err(ConfigError::NoStations);
        }
        for (field, value) in [
            ("arrival_rate", self.arrival_rate),
            ("transmission_rate", self.transmission_rate),
            ("packet_length", self.packet_length),
            ("station_spacing", self.station_spacing),
            ("propagation_speed", self.propagation_speed),
            ("horizon", self.horizon),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Time to put one packet on the wire (s).
    pub fn trans_delay(&self) -> f64 {
        self.packet_length / self.transmission_rate
    }

    /// Propagation delay between adjacent stations (s).
    pub fn hop_prop_delay(&self) -> f64 {
        self.station_spacing / self.propagation_speed
    }

    /// Backoff slot duration: 512 bit times (s).
    pub fn slot_time(&self) -> f64 {
        512.0 / self.transmission_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_stations() {
        let cfg = SimConfig {
            stations: 0,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::NoStations)));
    }

    #[test]
    fn rejects_non_positive_and_non_finite_fields() {
        for (patch, field) in [
            (
                SimConfig {
                    arrival_rate: 0.0,
                    ..SimConfig::default()
                },
                "arrival_rate",
            ),
            (
                SimConfig {
                    propagation_speed: -1.0,
                    ..SimConfig::default()
                },
                "propagation_speed",
            ),
            (
                SimConfig {
                    horizon: f64::NAN,
                    ..SimConfig::default()
                },
                "horizon",
            ),
        ] {
            match patch.validate() {
                Err(ConfigError::NonPositive { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected NonPositive({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn derived_delays() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.trans_delay(), 1500.0 / 1e6);
        assert_eq!(cfg.hop_prop_delay(), 10.0 / 2e8);
        assert_eq!(cfg.slot_time(), 512.0 / 1e6);
    }
}
