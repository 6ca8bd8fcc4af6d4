//! services/api/src/adapters/clock.rs
//!
//! The `Clock` port backed by the host's local calendar.

use chrono::{Local, NaiveDate};
use journal_core::ports::Clock;

/// Reads "today" from the system clock in the server's local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
