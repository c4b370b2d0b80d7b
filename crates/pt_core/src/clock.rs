use chrono::{DateTime, Utc};

/// Source of the current instant.
///
/// Injected wherever "now" feeds a computed value so resolution stays
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
