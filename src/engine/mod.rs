pub mod focus;
pub mod pause;
pub mod session;

pub use focus::FocusTimer;
pub use pause::{breaks_due, secs_until_next_break, PauseReminder};
pub use session::SessionEngine;
