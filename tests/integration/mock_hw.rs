//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO.

use std::cell::Cell;

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone};
use pumpcontrol::app::events::AppEvent;
use pumpcontrol::app::ports::{Clock, EventSink, LevelPort, PumpPort};
use pumpcontrol::error::{ActuatorError, SensorError};
use pumpcontrol::sensors::level::ProbeStates;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPump(bool),
    Heartbeat,
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub probes: usize,
    pub wet: usize,
    pub fail_read: bool,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    /// A ten-probe column at `percent` fill.
    pub fn at_percent(percent: usize) -> Self {
        Self {
            probes: 10,
            wet: percent / 10,
            fail_read: false,
            calls: Vec::new(),
        }
    }

    pub fn set_percent(&mut self, percent: usize) {
        self.wet = percent / 10;
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                ActuatorCall::Heartbeat => None,
            })
            .unwrap_or(false)
    }

    pub fn heartbeats(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::Heartbeat)
            .count()
    }
}

impl LevelPort for MockHardware {
    fn read_probes(&mut self) -> Result<ProbeStates, SensorError> {
        if self.fail_read {
            return Err(SensorError::ProbeReadFailed { index: 0 });
        }
        Ok((0..self.probes).map(|i| i < self.wet).collect())
    }
}

impl PumpPort for MockHardware {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::SetPump(on));
        Ok(())
    }

    fn heartbeat(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Heartbeat);
        Ok(())
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Settable clock.  Starts at the given local time in UTC+01:00.
pub struct FakeClock {
    now: Cell<DateTime<FixedOffset>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Self {
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap();
        Self { now: Cell::new(now) }
    }

    /// 2024-01-01 is a Monday.
    pub fn monday(h: u32, mi: u32) -> Self {
        Self::at(2024, 1, 1, h, mi)
    }

    pub fn advance(&self, d: TimeDelta) {
        self.now.set(self.now.get() + d);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

impl Clock for &FakeClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
