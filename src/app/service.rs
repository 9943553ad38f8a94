//! The control loop.
//!
//! [`ControlLoop`] owns the mode arbiter, the pump running state and the
//! last-known-good admission parameters.  All I/O flows through port
//! traits injected at call sites, so the whole loop is testable with mock
//! adapters.
//!
//! ```text
//!   LevelPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         ControlLoop          │
//!    PumpPort ◀── │ Hysteresis · ModeArbiter     │ ◀── ConfigStore
//!                 └──────────────────────────────┘ ◀── Clock
//! ```
//!
//! ## Cycle
//!
//! 1. read the level (a failed read means "not allowed" this cycle)
//! 2. read threshold and band, falling back on failure
//! 3. refresh the mode from the store
//! 4. `allowed` from hysteresis, `desired` from the active mode
//! 5. drive the pump to `allowed && desired`, remember it
//! 6. beat the heartbeat, emit the cycle record
//!
//! Nothing inside a cycle can abort the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::hysteresis::{self, AdmissionParams};
use crate::error::{ConfigError, Error};
use crate::mode::{ModeArbiter, OperatingMode};
use crate::sensors::level::FillLevel;

use super::events::{AppEvent, CycleRecord};
use super::ports::{Clock, ConfigKey, ConfigStore, EventSink, LevelPort, PumpPort};

/// Longest uninterrupted sleep between shutdown-flag checks.
const SLEEP_SLICE: Duration = Duration::from_secs(1);

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop<S, C> {
    config: SystemConfig,
    store: S,
    clock: C,
    arbiter: ModeArbiter,
    /// Only state fed back into the next cycle's admission decision.
    pump_running: bool,
    last_good: AdmissionParams,
    cycle_count: u64,
}

impl<S: ConfigStore, C: Clock> ControlLoop<S, C> {
    /// Construct the loop.  Does **not** touch hardware; call
    /// [`start`](Self::start) next.
    pub fn new(config: SystemConfig, store: S, clock: C) -> Self {
        let arbiter = ModeArbiter::new(config.initial_mode);
        let last_good = AdmissionParams::from_config(&config);
        Self {
            config,
            store,
            clock,
            arbiter,
            pump_running: false,
            last_good,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.arbiter.current()));
        info!(
            "ControlLoop: started in {} (poll every {} s)",
            self.arbiter.current(),
            self.config.poll_interval_secs
        );
    }

    /// Drive every output off and announce the stop.
    pub fn shutdown(&mut self, hw: &mut impl PumpPort, sink: &mut impl EventSink) {
        hw.all_off();
        if self.pump_running {
            sink.emit(&AppEvent::PumpChanged { running: false });
        }
        self.pump_running = false;
        sink.emit(&AppEvent::Stopped);
        info!("ControlLoop: stopped after {} cycles, pump off", self.cycle_count);
    }

    /// Cycle until `stop` is raised, then shut down.
    ///
    /// The flag is checked between cycles and at least once a second
    /// while sleeping.
    pub fn run(
        &mut self,
        hw: &mut (impl LevelPort + PumpPort),
        sink: &mut impl EventSink,
        stop: &AtomicBool,
    ) {
        let interval = Duration::from_secs(u64::from(self.config.poll_interval_secs));
        while !stop.load(Ordering::Relaxed) {
            self.tick(hw, sink);

            let mut left = interval;
            while !left.is_zero() && !stop.load(Ordering::Relaxed) {
                let slice = left.min(SLEEP_SLICE);
                std::thread::sleep(slice);
                left -= slice;
            }
        }
        self.shutdown(hw, sink);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`LevelPort`] and
    /// [`PumpPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl LevelPort + PumpPort),
        sink: &mut impl EventSink,
    ) -> CycleRecord {
        self.cycle_count += 1;
        let now = self.clock.now();

        // 1. Level
        let level = match hw.read_probes() {
            Ok(states) => Some(FillLevel::from_probes(&states)),
            Err(e) => {
                warn!("ControlLoop: level unavailable ({e}), pump not allowed");
                sink.emit(&AppEvent::SensorFault(e));
                None
            }
        };

        // 2. Admission parameters
        let params = self.refresh_params(sink);

        // 3. Mode
        self.refresh_mode(sink);
        let mode = self.arbiter.current();

        // 4. Decide
        let allowed =
            level.is_some_and(|l| hysteresis::is_allowed(l, self.pump_running, params));
        let desired = match self.arbiter.desired(&self.store, now) {
            Ok(d) => d,
            Err(error) => {
                report_desire_failure(mode, &error);
                sink.emit(&AppEvent::DesireUnavailable { mode, error });
                false
            }
        };
        let next = allowed && desired;

        // 5. Actuate
        match hw.set_pump(next) {
            Ok(()) if next != self.pump_running => {
                info!("ControlLoop: pump {}", if next { "ON" } else { "OFF" });
                sink.emit(&AppEvent::PumpChanged { running: next });
            }
            Ok(()) => {}
            Err(e) => {
                warn!("ControlLoop: {e}");
                sink.emit(&AppEvent::ActuatorFault(e));
            }
        }
        self.pump_running = next;

        // 6. Heartbeat and record
        if let Err(e) = hw.heartbeat() {
            debug!("ControlLoop: {e}");
            sink.emit(&AppEvent::ActuatorFault(e));
        }

        let record = CycleRecord {
            at: now,
            cycle: self.cycle_count,
            level,
            mode,
            low_threshold: params.low_threshold,
            band: params.band,
            allowed,
            desired,
            running: next,
        };
        sink.emit(&AppEvent::Cycle(record.clone()));
        record
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn pump_running(&self) -> bool {
        self.pump_running
    }

    pub fn mode(&self) -> OperatingMode {
        self.arbiter.current()
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Admission parameters used by the most recent cycle.
    pub fn admission(&self) -> AdmissionParams {
        self.last_good
    }

    // ── Internal ──────────────────────────────────────────────

    fn refresh_params(&mut self, sink: &mut impl EventSink) -> AdmissionParams {
        match hysteresis::read_threshold(&self.store) {
            Ok(t) => self.last_good.low_threshold = t,
            Err(error) => fallback(sink, ConfigKey::Threshold, error, self.last_good.low_threshold),
        }
        match hysteresis::read_band(&self.store) {
            Ok(b) => self.last_good.band = b,
            Err(error) => fallback(sink, ConfigKey::Hysteresis, error, self.last_good.band),
        }
        self.last_good
    }

    fn refresh_mode(&mut self, sink: &mut impl EventSink) {
        let from = self.arbiter.current();
        match self.arbiter.refresh(&self.store) {
            Ok(true) => sink.emit(&AppEvent::ModeChanged {
                from,
                to: self.arbiter.current(),
            }),
            Ok(false) => {}
            Err(Error::Mode(error)) => {
                warn!("ControlLoop: {error}, staying in {from}");
                sink.emit(&AppEvent::ModeRejected { kept: from, error });
            }
            Err(Error::Config(error)) => fallback(sink, ConfigKey::Mode, error, from),
            Err(other) => warn!("ControlLoop: mode refresh failed ({other}), staying in {from}"),
        }
    }
}

fn fallback(
    sink: &mut impl EventSink,
    key: ConfigKey,
    error: ConfigError,
    value: impl std::fmt::Display,
) {
    warn!("ControlLoop: {error}, using {value}");
    sink.emit(&AppEvent::ConfigFallback {
        key,
        error,
        fallback: value.to_string(),
    });
}

/// Structural schedule violations, an unreadable schedule and every
/// other desire failure are logged differently.
fn report_desire_failure(mode: OperatingMode, error: &Error) {
    match error {
        Error::Schedule(e) if e.is_structural() => {
            warn!("ControlLoop: schedule rejected ({e}), pump not desired");
        }
        Error::Schedule(e) => warn!("ControlLoop: {e}, pump not desired"),
        other => warn!("ControlLoop: {mode} desire unavailable ({other}), pump not desired"),
    }
}
