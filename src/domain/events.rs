use super::TaskId;

/// Side effects the core asks its collaborators to perform.
/// Each is emitted exactly once per underlying transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Elapsed time went past estimate + tolerance
    TaskExceeded(TaskId),
    TaskCompleted { id: TaskId, point_awarded: bool },
    PauseReminderDue,
    /// Focus-mode countdown reached zero
    FocusTimerFinished,
    DayStarted,
    /// Alerts still on screen should be cleared
    DayEnded,
}
