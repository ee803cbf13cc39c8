use chrono::{DateTime, Utc};

/// Source of wall-clock time for the engine and the tick driver
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Hand-driven clock for tests
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(start)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(chrono::Duration::seconds(secs));
    }

    pub fn advance(&self, delta: chrono::Duration) {
        self.now.set(self.now.get() + delta);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
