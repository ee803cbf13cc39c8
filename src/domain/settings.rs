use crate::error::CommandError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Working hours, as "HH:MM" strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDay {
    pub start: String,
    pub end: String,
}

impl WorkDay {
    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        let start = NaiveTime::parse_from_str(&self.start, "%H:%M")
            .map_err(|_| CommandError::InvalidSettings("work day start must be HH:MM"))?;
        let end = NaiveTime::parse_from_str(&self.end, "%H:%M")
            .map_err(|_| CommandError::InvalidSettings("work day end must be HH:MM"))?;
        if end <= start {
            return Err(CommandError::InvalidSettings("work day must end after it starts"));
        }
        Ok(())
    }
}

/// Upper bound for every duration setting: one day
const MAX_MINUTES: u64 = 24 * 60;
const MAX_SECS: u64 = MAX_MINUTES * 60;

/// User settings. Every field has a default so partial files merge cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Grace period past the estimate before a task counts as exceeded (seconds)
    pub tolerance_time: u64,
    /// Work time between pause reminders (seconds)
    pub pause_interval: u64,
    /// Suggested length of a pause (minutes)
    pub pause_duration: u64,
    /// How long a snoozed reminder stays quiet (minutes)
    pub snooze_duration: u64,
    pub focus_mode_enabled: bool,
    /// Focus-mode countdown length (minutes)
    pub pomodoro_timer: u64,
    pub notifications: bool,
    pub auto_backup: bool,
    pub work_day: Option<WorkDay>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance_time: 300,
            pause_interval: 2 * 60 * 60,
            pause_duration: 15,
            snooze_duration: 15,
            focus_mode_enabled: false,
            pomodoro_timer: 25,
            notifications: true,
            auto_backup: true,
            work_day: None,
        }
    }
}

impl Settings {
    pub fn snooze_secs(&self) -> u64 {
        self.snooze_duration.saturating_mul(60)
    }

    pub fn pomodoro_secs(&self) -> u64 {
        self.pomodoro_timer.saturating_mul(60)
    }

    pub fn pause_secs(&self) -> u64 {
        self.pause_duration.saturating_mul(60)
    }

    /// Apply a patch, or leave `self` untouched if any field is invalid
    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<(), CommandError> {
        let mut next = self.clone();

        if let Some(v) = patch.tolerance_time {
            next.tolerance_time = v;
        }
        if let Some(v) = patch.pause_interval {
            next.pause_interval = v;
        }
        if let Some(v) = patch.pause_duration {
            next.pause_duration = v;
        }
        if let Some(v) = patch.snooze_duration {
            next.snooze_duration = v;
        }
        if let Some(v) = patch.focus_mode_enabled {
            next.focus_mode_enabled = v;
        }
        if let Some(v) = patch.pomodoro_timer {
            next.pomodoro_timer = v;
        }
        if let Some(v) = patch.notifications {
            next.notifications = v;
        }
        if let Some(v) = patch.auto_backup {
            next.auto_backup = v;
        }
        if let Some(work_day) = &patch.work_day {
            next.work_day = work_day.clone();
        }

        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CommandError> {
        if self.pause_interval == 0 {
            return Err(CommandError::InvalidSettings("pause interval must be positive"));
        }
        if self.snooze_duration == 0 {
            return Err(CommandError::InvalidSettings("snooze duration must be positive"));
        }
        if self.pomodoro_timer == 0 {
            return Err(CommandError::InvalidSettings("pomodoro timer must be positive"));
        }
        if self.pause_interval > MAX_SECS || self.tolerance_time > MAX_SECS {
            return Err(CommandError::InvalidSettings(
                "pause interval and tolerance must be at most a day",
            ));
        }
        if [self.pause_duration, self.snooze_duration, self.pomodoro_timer]
            .iter()
            .any(|&minutes| minutes > MAX_MINUTES)
        {
            return Err(CommandError::InvalidSettings("durations must be at most a day"));
        }
        if let Some(work_day) = &self.work_day {
            work_day.validate()?;
        }
        Ok(())
    }
}

/// Partial settings update; `None` leaves a field as it is.
/// `work_day: Some(None)` clears the working hours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub tolerance_time: Option<u64>,
    pub pause_interval: Option<u64>,
    pub pause_duration: Option<u64>,
    pub snooze_duration: Option<u64>,
    pub focus_mode_enabled: Option<bool>,
    pub pomodoro_timer: Option<u64>,
    pub notifications: Option<bool>,
    pub auto_backup: Option<bool>,
    pub work_day: Option<Option<WorkDay>>,
}
