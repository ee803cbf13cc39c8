pub mod events;
pub mod session;
pub mod settings;
pub mod store;
pub mod task;

pub use events::SessionEvent;
pub use session::{SessionState, SessionStats};
pub use settings::{Settings, SettingsPatch, WorkDay};
pub use store::TaskStore;
pub use task::{format_clock, format_work_time, Task, TaskId, Tracking};

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Day not started yet
    StartScreen,
    Normal,
    AddingTask,
    PauseReminder,
    /// A task went past its estimate + tolerance
    ExceededAlert,
    ConfirmEndDay,
    Focus,
}
