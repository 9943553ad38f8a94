//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (probes, relay, control files, clock, event sinks)
//! implement these traits.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the decision core never touches
//! hardware, files or the network directly.
//!
//! ## Staleness
//!
//! The control loop re-reads every [`ConfigStore`] value it needs on every
//! cycle and never caches one beyond that cycle (apart from the
//! last-known-good admission parameters).  An external writer's change is
//! therefore picked up at most one poll interval later.

use core::fmt;

use chrono::{DateTime, FixedOffset};

use crate::error::{ActuatorError, ConfigError, SensorError, TelemetryError};
use crate::sensors::level::ProbeStates;

// ───────────────────────────────────────────────────────────────
// Level port (driven adapter: probes → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle for probe states.
pub trait LevelPort {
    /// Sample every probe, ordered from the bottom of the tank upwards.
    fn read_probes(&mut self) -> Result<ProbeStates, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Pump port (driven adapter: domain → relay / indicator)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the pump and heartbeat.
pub trait PumpPort {
    /// Drive the pump relay on or off.
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Advance the heartbeat indicator by one beat.
    fn heartbeat(&mut self) -> Result<(), ActuatorError>;

    /// Pump off, indicator off.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.  Local civil time with its UTC offset, so the
/// schedule sees local weekdays and the timer sees absolute instants.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → log / CSV / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, CSV file,
/// telemetry upload).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan-out so the loop can feed several sinks through one port.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// An absent sink drops everything (e.g. telemetry disabled).
impl<T: EventSink> EventSink for Option<T> {
    fn emit(&mut self, event: &super::events::AppEvent) {
        if let Some(sink) = self {
            sink.emit(event);
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → remote dashboard)
// ───────────────────────────────────────────────────────────────

/// Uploads one sample.  Implementations MUST bound the call with a hard
/// timeout; the control loop waits for it.
pub trait TelemetryPublisher {
    fn publish(
        &self,
        api_key: &str,
        sample: &super::events::TelemetrySample,
    ) -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration store (driven adapter: domain ↔ control files)
// ───────────────────────────────────────────────────────────────

/// Keys of the externally persisted control values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Low threshold, integer percent.
    Threshold,
    /// Hysteresis band width, integer percent.
    Hysteresis,
    /// Operating mode tag.
    Mode,
    /// Manual on/off.
    Manual,
    /// Weekly schedule rows.
    Schedule,
    /// Countdown timer expiry, Unix seconds.
    TimerExpiry,
    /// Telemetry API key.
    TelemetryKey,
}

impl ConfigKey {
    pub const ALL: [Self; 7] = [
        Self::Threshold,
        Self::Hysteresis,
        Self::Mode,
        Self::Manual,
        Self::Schedule,
        Self::TimerExpiry,
        Self::TelemetryKey,
    ];

    /// Stable string name of the key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Hysteresis => "hysteresis",
            Self::Mode => "mode",
            Self::Manual => "manual",
            Self::Schedule => "schedule",
            Self::TimerExpiry => "timer",
            Self::TelemetryKey => "telemetry_key",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// String-valued key/value access to the control values.
///
/// Implementations return the raw stored text; parsing and validation
/// belong to the domain type that owns the key.
///
/// # Atomicity
///
/// `set` MUST replace the value atomically so a concurrent reader sees
/// either the old or the new value, never a torn write.
pub trait ConfigStore {
    fn get(&self, key: ConfigKey) -> Result<String, ConfigError>;

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), ConfigError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn get(&self, key: ConfigKey) -> Result<String, ConfigError> {
        (**self).get(key)
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        (**self).set(key, value)
    }
}
