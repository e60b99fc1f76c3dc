use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDateTime};
use shared_models::SLOT_FORMAT;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Source of "now" for scheduling decisions. Times are local and naive.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// `YYYY-MM-DD` for the current day.
    fn today(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }

    /// The current minute as a slot key.
    fn current_slot(&self) -> String {
        self.now().format(SLOT_FORMAT).to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Parses `YYYY-MM-DD HH:MM`.
    pub fn at(slot: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(slot, SLOT_FORMAT).map(Self::new)
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_formats() {
        let clock = FixedClock::at("2025-04-05 10:00").unwrap();
        assert_eq!(clock.today(), "2025-04-05");
        assert_eq!(clock.current_slot(), "2025-04-05 10:00");

        clock.advance(Duration::minutes(90));
        assert_eq!(clock.current_slot(), "2025-04-05 11:30");
    }

    #[test]
    fn test_fixed_clock_rejects_bad_input() {
        assert!(FixedClock::at("2025-04-05").is_err());
        assert!(FixedClock::at("05/04/2025 10:00").is_err());
    }
}
