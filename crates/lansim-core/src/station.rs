//! Per-station state machine.
//!
//! A station owns its pre-generated packet backlog plus the hidden
//! retry state CSMA/CD hangs off it: the consecutive-collision stage
//! for truncated binary exponential backoff, the deferral stage used
//! while a non-persistent station waits out a busy bus, and the
//! backoff-shifted ready offset. The engine drives every transition;
//! the station never looks at other stations directly.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::variates::Variates;
use std::collections::VecDeque;

/// Maximum consecutive backoff stage. A packet whose collision stage
/// would pass this is dropped; the deferral stage is held here.
pub const MAX_BACKOFF_STAGE: u32 = 10;

/// Ceiling on non-persistent deferral draws per busy window. The loop
/// terminates with overwhelming probability long before this; hitting
/// the ceiling is an invariant violation, not a retry condition.
const DEFERRAL_DRAW_CEILING: u32 = 100_000;

/// Channel constants shared by every station in one run.
#[derive(Debug, Clone, Copy)]
pub struct ChannelParams {
    /// Backoff slot duration (512 bit times), seconds.
    pub slot_time: f64,
    /// Time to transmit one packet, seconds.
    pub trans_delay: f64,
    /// Propagation delay between adjacent stations, seconds.
    pub hop_prop_delay: f64,
    /// Carrier-sense deferral policy.
    pub persistent: bool,
}

impl ChannelParams {
    pub fn from_config(cfg: &SimConfig) -> Self {
        ChannelParams {
            slot_time: cfg.slot_time(),
            trans_delay: cfg.trans_delay(),
            hop_prop_delay: cfg.hop_prop_delay(),
            persistent: cfg.persistent,
        }
    }
}

/// One node on the shared bus.
#[derive(Debug)]
pub struct Station {
    id: usize,
    /// Packet-ready timestamps, monotonically increasing. Shrinks only
    /// from the front (success or terminal drop), never grows mid-run.
    arrivals: VecDeque<f64>,
    /// Consecutive collisions for the head packet.
    collision_stage: u32,
    /// Consecutive deferrals while waiting out a busy window
    /// (non-persistent mode only).
    deferral_stage: u32,
    /// Backoff-shifted ready offset. `NEG_INFINITY` means unset; the
    /// ready-time invariant takes the max against the head timestamp.
    adjusted_ready: f64,
}

impl Station {
    pub fn new(id: usize, arrivals: VecDeque<f64>) -> Self {
        Station {
            id,
            arrivals,
            collision_stage: 0,
            deferral_stage: 0,
            adjusted_ready: f64::NEG_INFINITY,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn backlog(&self) -> usize {
        self.arrivals.len()
    }

    /// Effective transmission-readiness time:
    /// `max(adjusted_ready, head timestamp)`, or `+∞` once the backlog
    /// is empty — an emptied station is never a sender again.
    pub fn ready_time(&self) -> f64 {
        match self.arrivals.front() {
            Some(&head) => self.adjusted_ready.max(head),
            None => f64::INFINITY,
        }
    }

    fn prop_delay_to(&self, other: usize, params: &ChannelParams) -> f64 {
        self.id.abs_diff(other) as f64 * params.hop_prop_delay
    }

    /// Would this station's packet already be on the wire before the
    /// sender's signal could reach it? True iff
    /// `ready_time() <= now + prop_delay(sender)`.
    pub fn check_collision(&self, sender: usize, now: f64, params: &ChannelParams) -> bool {
        self.ready_time() <= now + self.prop_delay_to(sender, params)
    }

    /// React to a collision on the head packet.
    ///
    /// Advances the backoff stage; past [`MAX_BACKOFF_STAGE`] the
    /// packet is dropped and the station falls through to its next
    /// queued packet with no residual offset. Otherwise the ready time
    /// is pushed out by a uniform draw of `[0, 2^stage - 1]` slots.
    pub fn reschedule_collision(&mut self, params: &ChannelParams, vars: &mut Variates) {
        self.collision_stage += 1;
        if self.collision_stage > MAX_BACKOFF_STAGE {
            self.drop_head();
            return;
        }
        let backoff = vars.backoff_slots(self.collision_stage) as f64 * params.slot_time;
        self.adjusted_ready = self.ready_time() + backoff;
    }

    /// The head packet went out cleanly.
    pub fn transmission_success(&mut self) {
        self.drop_head();
    }

    fn drop_head(&mut self) {
        self.arrivals.pop_front();
        self.collision_stage = 0;
        // Clear the offset so the next packet's raw timestamp governs.
        self.adjusted_ready = f64::NEG_INFINITY;
    }

    /// React to a successful transmission from `sender` starting at
    /// `now`; called on every station, the sender included.
    ///
    /// The bus at this station is busy from `now + prop_delay` for one
    /// transmission delay. The sender and persistent stations wait
    /// exactly until the bus frees. A non-persistent bystander instead
    /// re-draws a capped random deferral until its ready time clears
    /// the busy window; each draw moves the ready time forward, so the
    /// loop converges, and the draw ceiling turns any failure to do so
    /// into a fatal fault.
    pub fn reschedule_busy_bus(
        &mut self,
        sender: usize,
        now: f64,
        params: &ChannelParams,
        vars: &mut Variates,
    ) -> Result<(), SimError> {
        if self.arrivals.is_empty() {
            return Ok(());
        }

        let busy_start = now + self.prop_delay_to(sender, params);
        let busy_end = busy_start + params.trans_delay;

        if params.persistent || self.id == sender {
            self.adjusted_ready = self.ready_time().max(busy_end);
            return Ok(());
        }

        let mut draws = 0;
        while self.ready_time() < busy_end {
            draws += 1;
            if draws > DEFERRAL_DRAW_CEILING {
                return Err(SimError::DeferralOverflow {
                    station: self.id,
                    iterations: draws,
                });
            }
            if self.deferral_stage < MAX_BACKOFF_STAGE {
                self.deferral_stage += 1;
            }
            let wait = vars.backoff_slots(self.deferral_stage) as f64 * params.slot_time;
            self.adjusted_ready = self.ready_time() + wait;
        }
        self.deferral_stage = 0;

        Ok(())
    }
}
