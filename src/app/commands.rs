//! Inbound operator commands.
//!
//! These are the changes a human can make to the control values while
//! the loop runs (from the CLI, or any other front end that links the
//! library).  Each command validates its value *before* anything is
//! written, so a rejected command leaves the store untouched; the loop
//! picks the change up on its next cycle.

use chrono::{DateTime, FixedOffset, TimeDelta};
use log::info;

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::{ConfigError, Error};
use crate::mode::OperatingMode;
use crate::scheduler::WeeklySchedule;
use crate::{manual, timer};

/// Commands that external front ends can send into the control store.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    SetMode(OperatingMode),
    SetManual(bool),
    /// Turn-off edge, 0-100%.
    SetThreshold(u8),
    /// Band width, 1-100%.
    SetHysteresis(u8),
    /// Replace the weekly schedule with the given text.
    SetSchedule(String),
    TimerAdd(TimeDelta),
    TimerSubtract(TimeDelta),
    TimerReset(TimeDelta),
    /// Telemetry API key.
    SetTelemetryKey(String),
}

impl OperatorCommand {
    /// Validate and persist.
    pub fn apply(&self, store: &impl ConfigStore, now: DateTime<FixedOffset>) -> Result<(), Error> {
        match self {
            Self::SetMode(mode) => store.set(ConfigKey::Mode, mode.tag())?,
            Self::SetManual(on) => manual::write(store, *on)?,
            Self::SetThreshold(p) => {
                if *p > 100 {
                    return Err(invalid(ConfigKey::Threshold, "threshold must be 0-100"));
                }
                store.set(ConfigKey::Threshold, &p.to_string())?;
            }
            Self::SetHysteresis(p) => {
                if !(1..=100).contains(p) {
                    return Err(invalid(ConfigKey::Hysteresis, "hysteresis band must be 1-100"));
                }
                store.set(ConfigKey::Hysteresis, &p.to_string())?;
            }
            Self::SetSchedule(text) => {
                WeeklySchedule::parse(text)?;
                store.set(ConfigKey::Schedule, text)?;
            }
            Self::TimerAdd(d) => {
                reject_negative(*d)?;
                timer::add(store, now, *d)?;
            }
            Self::TimerSubtract(d) => {
                reject_negative(*d)?;
                timer::subtract(store, now, *d)?;
            }
            Self::TimerReset(d) => {
                reject_negative(*d)?;
                timer::reset(store, now, *d)?;
            }
            Self::SetTelemetryKey(key) => {
                if key.trim().is_empty() {
                    return Err(invalid(ConfigKey::TelemetryKey, "API key must not be empty"));
                }
                store.set(ConfigKey::TelemetryKey, key.trim())?;
            }
        }
        info!("OperatorCommand: applied {self:?}");
        Ok(())
    }
}

fn invalid(key: ConfigKey, reason: &'static str) -> Error {
    ConfigError::Invalid { key, reason }.into()
}

fn reject_negative(d: TimeDelta) -> Result<(), Error> {
    if d < TimeDelta::zero() {
        return Err(invalid(ConfigKey::TimerExpiry, "duration must not be negative"));
    }
    Ok(())
}
