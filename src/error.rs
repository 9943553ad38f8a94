//! Unified error types for the pump controller.
//!
//! Every subsystem has its own small error enum; all of them convert into
//! the crate-wide [`Error`] so the control loop's handling stays uniform.
//! Variants are `Clone + PartialEq` so they can ride inside
//! [`AppEvent`](crate::app::events::AppEvent)s and be asserted on in tests.
//!
//! Only [`InitError`] is fatal.  Everything else is recovered inside the
//! cycle that produced it.

use std::io;

use thiserror::Error;

use crate::app::ports::ConfigKey;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("sensor: {0}")]
    Sensor(#[from] SensorError),
    #[error("actuator: {0}")]
    Actuator(#[from] ActuatorError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("mode: {0}")]
    Mode(#[from] ModeError),
    #[error("telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("init: {0}")]
    Init(#[from] InitError),
}

// ---------------------------------------------------------------------------
// Configuration store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The backing file is missing or unreadable.
    #[error("{key}: read failed ({kind})")]
    Read { key: ConfigKey, kind: io::ErrorKind },
    /// The value could not be persisted.
    #[error("{key}: write failed ({kind})")]
    Write { key: ConfigKey, kind: io::ErrorKind },
    /// The value is not of the expected type or format.
    #[error("{key}: cannot parse {value:?}")]
    Parse { key: ConfigKey, value: String },
    /// The value parsed but is outside its permitted range.
    #[error("{key}: {reason}")]
    Invalid { key: ConfigKey, reason: &'static str },
}

// ---------------------------------------------------------------------------
// Weekly schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A row has a start time without a matching end time.
    #[error("{day}: window is missing its end time")]
    UnpairedWindow { day: String },
    /// A window ends at or before its start.
    #[error("{day}: window {window} ends before it starts")]
    InvertedWindow { day: String, window: usize },
    /// A window starts before the previous one in the same row ends.
    #[error("{day}: window {window} overlaps the previous window")]
    OverlappingWindows { day: String, window: usize },
    /// A time field is not `HH:MM`.
    #[error("{day}: {value:?} is not a HH:MM time")]
    InvalidTime { day: String, value: String },
    /// More windows in one row than the fixed per-day capacity.
    #[error("{day}: more than {max} windows", max = crate::scheduler::MAX_WINDOWS_PER_DAY)]
    TooManyWindows { day: String },
    /// More than seven rows.
    #[error("{count} rows, a week has 7")]
    TooManyDays { count: usize },
    /// The schedule source could not be read at all.
    #[error("schedule unavailable: {0}")]
    Unavailable(#[from] ConfigError),
}

impl ScheduleError {
    /// `true` for violations of the table's structure, `false` when the
    /// schedule simply could not be read.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

// ---------------------------------------------------------------------------
// Operating mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    #[error("unrecognized mode tag {tag:?}")]
    Unrecognized { tag: String },
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// No API key / endpoint available.
    #[error("telemetry not configured")]
    NotConfigured,
    /// Connection, TLS or timeout failure.
    #[error("transport: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP status {status}")]
    Http { status: u16 },
    /// The endpoint accepted the request but refused the update.
    #[error("update rejected by endpoint")]
    Rejected,
}

// ---------------------------------------------------------------------------
// Hardware
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// A level probe input could not be read.
    #[error("level probe {index} read failed")]
    ProbeReadFailed { index: usize },
    /// The probe seed-voltage output could not be driven.
    #[error("probe seed output failed")]
    SeedWriteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// The pump relay output could not be driven.
    #[error("pump relay write failed")]
    PumpWriteFailed,
    /// The heartbeat indicator output could not be driven.
    #[error("status indicator write failed")]
    IndicatorWriteFailed,
}

/// Device initialisation failure.  The only fatal error class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("pump relay unavailable")]
    PumpUnavailable,
    #[error("status indicator unavailable")]
    IndicatorUnavailable,
    #[error("level probes unavailable: {0}")]
    ProbesUnavailable(&'static str),
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
