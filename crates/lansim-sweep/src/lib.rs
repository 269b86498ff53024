//! Sweep coordination for the CSMA/CD contention simulator.
//!
//! Expands an experiment plan into the cross-product of per-run
//! configurations, dispatches independent engine runs across a worker
//! pool, collects their outcomes over a channel (the only shared
//! sink), and exports the successful records as a delimited table.
//! A failed configuration never aborts its siblings.

pub mod export;
pub mod plan;
pub mod runner;

pub use plan::SweepPlan;
pub use runner::{run_sweep, RunOutcome};
