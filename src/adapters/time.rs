//! Wall-clock adapter.
//!
//! Local civil time with its current UTC offset, so the schedule sees
//! local weekdays and times while timer arithmetic stays on absolute
//! instants.

use chrono::{DateTime, FixedOffset, Local};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
