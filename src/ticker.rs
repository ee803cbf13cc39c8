use chrono::{DateTime, Utc};
use log::warn;
use std::time::Duration;

/// Input poll interval of the event loop in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Upper bound for a single time jump (tick gap or background interval).
/// Anything larger is treated as a clock change, not as work.
pub const MAX_DELTA_SECS: u64 = 12 * 60 * 60;

/// Get the event loop poll duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Convert a millisecond delta into whole seconds, clamping clock anomalies
pub fn clamp_delta_secs(delta_ms: i64) -> u64 {
    if delta_ms < 0 {
        warn!("clock went backwards by {}ms, ignoring interval", -delta_ms);
        return 0;
    }
    let secs = (delta_ms / 1000) as u64;
    if secs > MAX_DELTA_SECS {
        warn!(
            "time jump of {}s exceeds {}s, clamping",
            secs, MAX_DELTA_SECS
        );
        return MAX_DELTA_SECS;
    }
    secs
}

/// Delta-time source for the session engine.
///
/// Exactly one exists per started day: the engine creates it in `start_day`
/// and drops it in `end_day`. Each poll returns the whole seconds since the
/// previous poll and carries the sub-second remainder forward, so an
/// irregular host timer still adds up to wall-clock time.
#[derive(Debug, Clone)]
pub struct Ticker {
    last: DateTime<Utc>,
    carry_ms: i64,
}

impl Ticker {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last: now,
            carry_ms: 0,
        }
    }

    /// Whole seconds elapsed since the last poll
    pub fn poll(&mut self, now: DateTime<Utc>) -> u64 {
        let delta_ms = (now - self.last).num_milliseconds();
        self.last = now;

        if delta_ms < 0 {
            self.carry_ms = 0;
            return clamp_delta_secs(delta_ms);
        }

        let total = self.carry_ms + delta_ms;
        self.carry_ms = total % 1000;
        clamp_delta_secs(total - self.carry_ms)
    }

    /// Restart measuring from `now`, discarding anything pending.
    /// Used after background reconciliation already accounted for the gap.
    pub fn rebase(&mut self, now: DateTime<Utc>) {
        self.last = now;
        self.carry_ms = 0;
    }
}
