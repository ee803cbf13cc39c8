use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Day-level counters owned by the session engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    /// Seconds of active accrual across all tasks today
    pub total_work_time: u64,
    pub points: u32,
    #[serde(rename = "activePauses")]
    pub active_pause_count: u32,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub snooze_until: Option<DateTime<Utc>>,
    pub is_day_started: bool,
}

impl SessionState {
    /// Back to the zero state of a fresh day (does not start it)
    pub fn reset_counters(&mut self) {
        self.total_work_time = 0;
        self.points = 0;
        self.active_pause_count = 0;
        self.snooze_until = None;
    }

    pub fn is_snoozed(&self, now: DateTime<Utc>) -> bool {
        matches!(self.snooze_until, Some(until) if now < until)
    }
}

/// Read-only view for collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub points: u32,
    pub total_work_time: u64,
    pub active_pause_count: u32,
}

impl From<&SessionState> for SessionStats {
    fn from(state: &SessionState) -> Self {
        Self {
            points: state.points,
            total_work_time: state.total_work_time,
            active_pause_count: state.active_pause_count,
        }
    }
}
