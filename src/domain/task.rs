use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable task identifier, assigned by the task store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the active task is being observed by the tick loop, or has been
/// left running while the terminal lost focus and still owes the time since
/// `since`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tracking {
    #[default]
    Live,
    Suspended { since: DateTime<Utc> },
}

/// One unit of trackable work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Estimate in seconds
    pub estimated_time: u64,
    /// Accrued time in seconds
    pub elapsed_time: u64,
    pub is_active: bool,
    pub is_completed: bool,
    #[serde(default)]
    pub time_exceeded_notified: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub tracking: Tracking,
}

impl Task {
    pub fn new(id: TaskId, name: String, estimated_time: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            estimated_time,
            elapsed_time: 0,
            is_active: false,
            is_completed: false,
            time_exceeded_notified: false,
            created_at,
            completed_at: None,
            tracking: Tracking::Live,
        }
    }

    /// Stop accruing. The engine credits any pending background interval first.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.tracking = Tracking::Live;
    }

    /// Elapsed time past which the task counts as exceeded
    pub fn exceeded_threshold(&self, tolerance: u64) -> u64 {
        self.estimated_time.saturating_add(tolerance)
    }

    pub fn is_over_threshold(&self, tolerance: u64) -> bool {
        self.elapsed_time > self.exceeded_threshold(tolerance)
    }

    /// Seconds left before the estimate, zero once it is reached
    pub fn remaining_time(&self) -> u64 {
        self.estimated_time.saturating_sub(self.elapsed_time)
    }

    /// Whether completing now would earn a point
    pub fn within_estimate(&self) -> bool {
        self.elapsed_time <= self.estimated_time
    }

    /// Ratio of elapsed to estimate (0.0 to 1.0+)
    pub fn progress_ratio(&self) -> f64 {
        if self.estimated_time == 0 {
            return 1.0;
        }
        self.elapsed_time as f64 / self.estimated_time as f64
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.tracking, Tracking::Suspended { .. })
    }
}

/// Format seconds as "Xh Ym Zs", dropping leading zero units
pub fn format_work_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format seconds as a clock face, "MM:SS" or "H:MM:SS"
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
