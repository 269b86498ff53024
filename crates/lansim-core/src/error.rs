//! Run-level fault taxonomy.
//!
//! Configuration errors are caught before a run starts. The remaining
//! variants are invariant violations: they indicate a modeling defect,
//! abort the affected run with a descriptive fault, and must never be
//! silently tolerated. A faulted run never touches its siblings.

use crate::config::ConfigError;
use thiserror::Error;

/// Fault that aborts a single contention-engine run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The non-persistent deferral loop failed to clear the sensed-busy
    /// window within its iteration ceiling.
    #[error("station {station}: deferral loop still inside busy window after {iterations} draws")]
    DeferralOverflow { station: usize, iterations: u32 },

    /// The event clock moved backwards, which the reschedule rules
    /// should make impossible.
    #[error("event clock regressed: sender {sender} ready at {at} < current time {current}")]
    ClockRegression { sender: usize, at: f64, current: f64 },
}
