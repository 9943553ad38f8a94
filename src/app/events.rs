//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: write a log line, append a CSV row,
//! upload a telemetry sample.

use chrono::{DateTime, FixedOffset};

use crate::app::ports::ConfigKey;
use crate::error::{ActuatorError, ConfigError, Error, ModeError, SensorError};
use crate::mode::OperatingMode;
use crate::sensors::level::FillLevel;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started (carries the initial mode).
    Started(OperatingMode),

    /// One control cycle completed.
    Cycle(CycleRecord),

    /// The pump drive changed state.
    PumpChanged { running: bool },

    /// The arbiter switched modes.
    ModeChanged {
        from: OperatingMode,
        to: OperatingMode,
    },

    /// The persisted mode tag was not recognised; the mode was kept.
    ModeRejected {
        kept: OperatingMode,
        error: ModeError,
    },

    /// A control value was unusable and a fallback was used instead.
    ConfigFallback {
        key: ConfigKey,
        error: ConfigError,
        fallback: String,
    },

    /// The active mode could not say whether the pump is desired; the
    /// cycle treats it as not desired.
    DesireUnavailable {
        mode: OperatingMode,
        error: Error,
    },

    /// The level could not be read this cycle.
    SensorFault(SensorError),

    /// An output could not be driven this cycle.
    ActuatorFault(ActuatorError),

    /// The control loop has stopped with the pump off.
    Stopped,
}

/// Everything decided in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pub at: DateTime<FixedOffset>,
    pub cycle: u64,
    /// `None` when the probes could not be read.
    pub level: Option<FillLevel>,
    pub mode: OperatingMode,
    pub low_threshold: u8,
    pub band: u8,
    pub allowed: bool,
    pub desired: bool,
    pub running: bool,
}

impl CycleRecord {
    /// Level in percent, if known.
    pub fn level_percent(&self) -> Option<f32> {
        self.level.map(FillLevel::percent)
    }
}

/// What goes to the remote dashboard each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub level_percent: f32,
    pub pump_running: bool,
}

impl TelemetrySample {
    /// `None` when the cycle has no level to report.
    pub fn from_record(record: &CycleRecord) -> Option<Self> {
        Some(Self {
            level_percent: record.level_percent()?,
            pump_running: record.running,
        })
    }
}
