//! Companion single-queue waiting-line simulation (M/M/1, M/M/1/K).
//!
//! A single transmitter drains a FIFO buffer: Poisson packet arrivals,
//! exponentially distributed packet lengths, and observer events at
//! five times the arrival rate sampling the queue occupancy. With a
//! bounded buffer, arrivals that find it full are dropped. Shares only
//! the exponential variate primitive with the contention engine.

use crate::arrivals;
use crate::config::ConfigError;
use crate::variates::Variates;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

/// Fault aborting a single waiting-line run.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A departure fired while the queue was empty.
    #[error("departure at t={at} with no packet in the queue")]
    PhantomDeparture { at: f64 },

    /// A computed departure time failed to move forward.
    #[error("departure time {departure} not after arrival {arrival}")]
    DepartureOrdering { arrival: f64, departure: f64 },
}

/// Parameters for one waiting-line run.
///
/// The arrival rate is derived from the target utilization:
/// `λ = utilization * transmission_rate / avg_packet_length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Mean packet length (bits); actual lengths are exponential.
    pub avg_packet_length: f64,
    /// Transmitter rate (bit/s).
    pub transmission_rate: f64,
    /// Simulated time horizon (s).
    pub horizon: f64,
    /// Target utilization ρ of the transmitter.
    pub utilization: f64,
    /// Buffer capacity in packets; `None` is an unbounded queue.
    pub buffer: Option<usize>,
    /// Seed for the run's private random stream.
    pub seed: u64,
}

impl QueueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("avg_packet_length", self.avg_packet_length),
            ("transmission_rate", self.transmission_rate),
            ("horizon", self.horizon),
            ("utilization", self.utilization),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.buffer == Some(0) {
            return Err(ConfigError::NonPositive {
                field: "buffer",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Packet arrival rate λ implied by the target utilization.
    pub fn arrival_rate(&self) -> f64 {
        self.utilization * self.transmission_rate / self.avg_packet_length
    }
}

/// Observer-sampled metrics of one waiting-line run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMetrics {
    pub utilization: f64,
    pub buffer: Option<usize>,
    /// Time-average queue occupancy E[N] (NaN without observers).
    pub avg_queue_len: f64,
    /// Fraction of observer samples that found the queue empty.
    pub idle_fraction: f64,
    /// Fraction of arrivals dropped at a full buffer (NaN without
    /// arrivals).
    pub loss_fraction: f64,
}

/// Run one waiting-line simulation to completion.
///
/// Arrival and observer timestamps are generated up front; departures
/// are produced on the fly as arrivals are admitted. Service is FIFO,
/// so departure times are non-decreasing and a three-way merge over
/// the sorted streams processes events in time order.
pub fn run_queue(cfg: &QueueConfig) -> Result<QueueMetrics, QueueError> {
    cfg.validate()?;

    let lambda = cfg.arrival_rate();
    let mut vars = Variates::from_seed(cfg.seed);
    let mut arrivals = arrivals::generate(&mut vars, lambda, cfg.horizon);
    let mut observers = arrivals::generate(&mut vars, lambda * 5.0, cfg.horizon);
    let mut departures: VecDeque<f64> = VecDeque::new();

    let capacity = cfg.buffer.unwrap_or(usize::MAX);
    let mut in_queue: usize = 0;
    let mut last_departure: f64 = 0.0;

    let mut total_arrivals: u64 = 0;
    let mut dropped: u64 = 0;
    let mut observed: u64 = 0;
    let mut idle: u64 = 0;
    let mut occupancy_sum: u64 = 0;

    loop {
        // Next event is the earliest front across the three streams.
        let next_arrival = arrivals.front().copied().unwrap_or(f64::INFINITY);
        let next_departure = departures.front().copied().unwrap_or(f64::INFINITY);
        let next_observer = observers.front().copied().unwrap_or(f64::INFINITY);

        if next_departure <= next_arrival && next_departure <= next_observer {
            if next_departure.is_infinite() {
                break;
            }
            departures.pop_front();
            in_queue = in_queue
                .checked_sub(1)
                .ok_or(QueueError::PhantomDeparture { at: next_departure })?;
        } else if next_arrival <= next_observer {
            let at = arrivals.pop_front().expect("arrival front checked");
            total_arrivals += 1;

            if in_queue < capacity {
                let packet_length = vars.exponential(1.0 / cfg.avg_packet_length);
                let service_time = packet_length / cfg.transmission_rate;
                let departure = if in_queue == 0 {
                    at + service_time
                } else {
                    last_departure.max(at) + service_time
                };
                if departure <= at || departure < last_departure {
                    return Err(QueueError::DepartureOrdering {
                        arrival: at,
                        departure,
                    });
                }
                last_departure = departure;
                departures.push_back(departure);
                in_queue += 1;
            } else {
                dropped += 1;
            }
        } else {
            observers.pop_front().expect("observer front checked");
            observed += 1;
            if in_queue == 0 {
                idle += 1;
            }
            occupancy_sum += in_queue as u64;
        }
    }

    debug!(
        utilization = cfg.utilization,
        buffer = ?cfg.buffer,
        total_arrivals,
        dropped,
        observed,
        "waiting-line run complete"
    );

    let (avg_queue_len, idle_fraction) = if observed == 0 {
        (f64::NAN, f64::NAN)
    } else {
        (
            occupancy_sum as f64 / observed as f64,
            idle as f64 / observed as f64,
        )
    };
    let loss_fraction = if total_arrivals == 0 {
        f64::NAN
    } else {
        dropped as f64 / total_arrivals as f64
    };

    Ok(QueueMetrics {
        utilization: cfg.utilization,
        buffer: cfg.buffer,
        avg_queue_len,
        idle_fraction,
        loss_fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(utilization: f64, buffer: Option<usize>) -> QueueConfig {
        QueueConfig {
            avg_packet_length: 2000.0,
            transmission_rate: 1e6,
            horizon: 100.0,
            utilization,
            buffer,
            seed: 77,
        }
    }

    #[test]
    fn unbounded_queue_never_drops() {
        let metrics = run_queue(&cfg(0.5, None)).unwrap();
        assert_eq!(metrics.loss_fraction, 0.0);
    }

    #[test]
    fn light_load_matches_mm1_theory() {
        // M/M/1: P_idle = 1 - ρ, E[N] = ρ / (1 - ρ).
        let metrics = run_queue(&cfg(0.25, None)).unwrap();
        assert!((metrics.idle_fraction - 0.75).abs() < 0.03);
        assert!((metrics.avg_queue_len - 1.0 / 3.0).abs() < 0.1);
    }

    #[test]
    fn occupancy_grows_with_utilization() {
        let low = run_queue(&cfg(0.3, None)).unwrap();
        let high = run_queue(&cfg(0.85, None)).unwrap();
        assert!(high.avg_queue_len > low.avg_queue_len);
        assert!(high.idle_fraction < low.idle_fraction);
    }

    #[test]
    fn overloaded_finite_buffer_drops_most_arrivals() {
        let metrics = run_queue(&cfg(5.0, Some(10))).unwrap();
        assert!(metrics.loss_fraction > 0.5);
        // Occupancy is pinned near the buffer limit.
        assert!(metrics.avg_queue_len > 8.0);
        assert!(metrics.avg_queue_len <= 10.0);
    }

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let a = run_queue(&cfg(0.9, Some(25))).unwrap();
        let b = run_queue(&cfg(0.9, Some(25))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(run_queue(&QueueConfig {
            utilization: -1.0,
            ..cfg(0.5, None)
        })
        .is_err());
        assert!(run_queue(&QueueConfig {
            buffer: Some(0),
            ..cfg(0.5, None)
        })
        .is_err());
    }
}
