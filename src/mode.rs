//! Operating mode and the arbiter that owns it.
//!
//! ```text
//!            ┌──────────┐
//!      ┌────▶│  MANUAL  │◀────┐
//!      │     └──────────┘     │
//!      ▼                      ▼
//! ┌───────────┐         ┌──────────┐
//! │ SCHEDULED │◀───────▶│  TIMED   │
//! └───────────┘         └──────────┘
//! ```
//!
//! Every transition is legal.  Switching to the current mode is a no-op.
//! The mode decides which source answers "is the pump desired now":
//!
//! | Mode        | Desire source                      |
//! |-------------|------------------------------------|
//! | `MANUAL`    | [`manual::read`]                   |
//! | `SCHEDULED` | [`WeeklySchedule::is_desired`]     |
//! | `TIMED`     | [`timer::is_desired`]              |

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, FixedOffset};
use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::{Error, ModeError};
use crate::scheduler::WeeklySchedule;
use crate::{manual, timer};

// ---------------------------------------------------------------------------
// Mode tag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingMode {
    Manual,
    Scheduled,
    Timed,
}

impl OperatingMode {
    pub const ALL: [Self; 3] = [Self::Manual, Self::Scheduled, Self::Timed];

    /// Persisted tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Scheduled => "SCHEDULED",
            Self::Timed => "TIMED",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for OperatingMode {
    type Err = ModeError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| ModeError::Unrecognized { tag: tag.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Arbiter
// ---------------------------------------------------------------------------

/// Sole owner of the in-memory mode.
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    current: OperatingMode,
}

impl ModeArbiter {
    pub fn new(initial: OperatingMode) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> OperatingMode {
        self.current
    }

    /// Switch to `next`.  Returns `true` if the mode actually changed.
    pub fn switch(&mut self, next: OperatingMode) -> bool {
        if next == self.current {
            return false;
        }
        info!("ModeArbiter: {} -> {}", self.current, next);
        self.current = next;
        true
    }

    /// Parse `tag` and switch to it.  An unrecognised tag leaves the
    /// current mode in place.
    pub fn switch_tag(&mut self, tag: &str) -> Result<bool, ModeError> {
        let next = tag.parse::<OperatingMode>()?;
        Ok(self.switch(next))
    }

    /// Re-read the persisted mode tag and switch to it.
    ///
    /// On a read failure or an unrecognised tag the previous mode is kept
    /// and the error returned for the caller to log.
    pub fn refresh(&mut self, store: &impl ConfigStore) -> Result<bool, Error> {
        let tag = store.get(ConfigKey::Mode)?;
        Ok(self.switch_tag(&tag)?)
    }

    /// Ask the current mode's desire source whether the pump should run.
    pub fn desired(&self, store: &impl ConfigStore, now: DateTime<FixedOffset>) -> Result<bool, Error> {
        match self.current {
            OperatingMode::Manual => Ok(manual::read(store)?),
            OperatingMode::Scheduled => Ok(WeeklySchedule::from_store(store)?.is_desired(&now)),
            OperatingMode::Timed => Ok(timer::is_desired(store, now)?),
        }
    }
}
