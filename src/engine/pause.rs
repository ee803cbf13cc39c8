use crate::domain::SessionState;
use chrono::{DateTime, Duration, Utc};

/// Number of breaks earned by `total_work_time` seconds of work
pub fn breaks_due(total_work_time: u64, pause_interval: u64) -> u64 {
    if pause_interval == 0 {
        return 0;
    }
    total_work_time / pause_interval
}

/// Longest a reminder can be snoozed in one go
const MAX_SNOOZE_SECS: i64 = 24 * 60 * 60;

/// Work seconds left before the next break is earned
pub fn secs_until_next_break(total_work_time: u64, pause_interval: u64, taken: u32) -> Option<u64> {
    if pause_interval == 0 {
        return None;
    }
    let next = (u64::from(taken) + 1).saturating_mul(pause_interval);
    Some(next.saturating_sub(total_work_time))
}

/// Break reminder scheduler.
///
/// Due-ness is derived from accumulated work time against the number of
/// breaks already taken, never from a countdown, so a large reconciled
/// interval makes a reminder due on the very next evaluation.
#[derive(Debug, Clone, Default)]
pub struct PauseReminder {
    shown: bool,
}

impl PauseReminder {
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Whether a hidden reminder should now be shown
    pub fn is_due(&self, session: &SessionState, pause_interval: u64, now: DateTime<Utc>) -> bool {
        session.is_day_started
            && !self.shown
            && !session.is_snoozed(now)
            && breaks_due(session.total_work_time, pause_interval)
                > u64::from(session.active_pause_count)
    }

    /// Show the reminder if it is due. Returns true only on the transition.
    pub fn evaluate(
        &mut self,
        session: &SessionState,
        pause_interval: u64,
        now: DateTime<Utc>,
    ) -> bool {
        if self.is_due(session, pause_interval, now) {
            self.shown = true;
            true
        } else {
            false
        }
    }

    /// The user took the break
    pub fn confirm(&mut self, session: &mut SessionState) {
        session.active_pause_count += 1;
        session.snooze_until = None;
        self.shown = false;
    }

    /// Hide the reminder until `now + duration_secs`; the break stays owed
    pub fn snooze(&mut self, session: &mut SessionState, duration_secs: u64, now: DateTime<Utc>) {
        let secs = i64::try_from(duration_secs)
            .unwrap_or(MAX_SNOOZE_SECS)
            .min(MAX_SNOOZE_SECS);
        session.snooze_until = Some(now + Duration::seconds(secs));
        self.shown = false;
    }

    pub fn dismiss(&mut self) {
        self.shown = false;
    }
}
