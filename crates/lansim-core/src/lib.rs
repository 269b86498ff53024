//! Discrete-event simulation of contention on a shared CSMA/CD bus.
//!
//! Stations attached to a common broadcast medium sense the carrier,
//! detect collisions through propagation-delay windows, and retry with
//! truncated binary exponential backoff. A run measures channel
//! efficiency and throughput for one (station count, arrival rate,
//! persistence mode) configuration.
//!
//! # Organization
//! - [`variates`] — seeded exponential and backoff-slot sampling
//! - [`arrivals`] — per-station Poisson arrival sequences
//! - [`station`] — per-station backlog and backoff state machine
//! - [`engine`] — the contention event loop
//! - [`metrics`] — efficiency / throughput reduction
//! - [`queue`] — companion single-queue (M/M/1, M/M/1/K) simulation
//!
//! Every run is deterministic for a fixed seed: the engine owns one
//! private random stream and breaks ready-time ties by lowest station
//! id. Runs share no state, so a sweep can execute them in parallel
//! without synchronization.

pub mod arrivals;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod station;
pub mod variates;

pub use config::{ConfigError, SimConfig};
pub use engine::{run_config, Engine};
pub use error::SimError;
pub use metrics::MetricsRecord;
pub use variates::Variates;
