/// Pomodoro countdown shown in focus mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTimer {
    duration: u64,
    remaining: u64,
    running: bool,
    finished: bool,
}

impl FocusTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration: duration_secs,
            remaining: duration_secs,
            running: false,
            finished: false,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Start or pause; a finished timer must be reset first
    pub fn toggle(&mut self) {
        if self.finished {
            return;
        }
        self.running = !self.running;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
        self.running = false;
        self.finished = false;
    }

    /// Change the length; restarts the countdown
    pub fn set_duration(&mut self, duration_secs: u64) {
        self.duration = duration_secs;
        self.reset();
    }

    /// Count down by `secs`. Returns true exactly once, when zero is reached.
    pub fn advance(&mut self, secs: u64) -> bool {
        if !self.running || self.finished {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(secs);
        if self.remaining == 0 {
            self.running = false;
            self.finished = true;
            return true;
        }
        false
    }
}
