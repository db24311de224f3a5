//! Wall-clock access for the submission pipeline
//!
//! Validation compares order dates against the server's local calendar day and
//! rendered emails carry a submission timestamp. Both read time through
//! [`Clock`] so tests can freeze it.

use chrono::{DateTime, Local, NaiveDate};

/// Source of the current local time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// The current local calendar day
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The process clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock stopped at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Local>,
}

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.at
    }
}
