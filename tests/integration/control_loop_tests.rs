//! Integration tests for the level → decision → pump pipeline.
//!
//! Drives [`ControlLoop`] cycle by cycle against mock hardware, an
//! in-memory control store and a settable clock.

use chrono::TimeDelta;
use pumpcontrol::adapters::memory_store::MemoryStore;
use pumpcontrol::app::events::AppEvent;
use pumpcontrol::app::ports::{Clock, ConfigKey};
use pumpcontrol::app::service::ControlLoop;
use pumpcontrol::config::SystemConfig;
use pumpcontrol::error::{Error, ScheduleError};
use pumpcontrol::mode::OperatingMode;

use crate::mock_hw::{ActuatorCall, FakeClock, MockHardware, RecordingSink};

fn scheduled_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert(ConfigKey::Threshold, "30");
    store.insert(ConfigKey::Hysteresis, "10");
    store.insert(ConfigKey::Mode, "SCHEDULED");
    store.insert(ConfigKey::Schedule, "Monday,09:00,12:00\nTuesday\n");
    store
}

// ── End-to-end decision ──────────────────────────────────────

#[test]
fn half_full_inside_window_turns_pump_on() {
    let store = scheduled_store();
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(50);
    let mut sink = RecordingSink::new();

    let rec = cl.tick(&mut hw, &mut sink);
    assert!(rec.allowed && rec.desired && rec.running);
    assert!(hw.pump_on());
    assert!(sink.events.contains(&AppEvent::PumpChanged { running: true }));
}

#[test]
fn outside_window_pump_stays_off_regardless_of_level() {
    let store = scheduled_store();
    let clock = FakeClock::monday(13, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut sink = RecordingSink::new();

    for pct in [50, 100] {
        let mut hw = MockHardware::at_percent(pct);
        let rec = cl.tick(&mut hw, &mut sink);
        assert!(rec.allowed);
        assert!(!rec.desired);
        assert!(!hw.pump_on());
    }
}

#[test]
fn window_end_stops_running_pump() {
    let store = scheduled_store();
    let clock = FakeClock::monday(11, 59);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(80);
    let mut sink = RecordingSink::new();

    assert!(cl.tick(&mut hw, &mut sink).running);
    clock.advance(TimeDelta::minutes(1));
    assert!(!cl.tick(&mut hw, &mut sink).running);
    assert!(sink.events.contains(&AppEvent::PumpChanged { running: false }));
}

// ── Hysteresis through the loop ──────────────────────────────

#[test]
fn draining_tank_runs_until_bottom_of_band() {
    let store = scheduled_store();
    store.insert(ConfigKey::Mode, "MANUAL");
    store.insert(ConfigKey::Manual, "on");
    let clock = FakeClock::monday(6, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(30);
    let mut sink = RecordingSink::new();

    // Off until the top of the band, on until below the threshold.
    let mut seen = Vec::new();
    for pct in [30, 40, 70, 40, 30, 20, 30, 40] {
        hw.set_percent(pct);
        seen.push(cl.tick(&mut hw, &mut sink).running);
    }
    assert_eq!(seen, [false, true, true, true, true, false, false, true]);
    assert_eq!(hw.heartbeats(), 8);
}

// ── Mode arbitration ─────────────────────────────────────────

#[test]
fn mode_follows_store_and_keeps_last_good_on_garbage() {
    let store = scheduled_store();
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(50);
    let mut sink = RecordingSink::new();

    store.insert(ConfigKey::Mode, "TIMED");
    cl.tick(&mut hw, &mut sink);
    assert_eq!(cl.mode(), OperatingMode::Timed);

    store.insert(ConfigKey::Mode, "???");
    cl.tick(&mut hw, &mut sink);
    assert_eq!(cl.mode(), OperatingMode::Timed);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ModeRejected { kept: OperatingMode::Timed, .. })),
        1
    );
}

#[test]
fn timed_mode_runs_until_expiry() {
    let store = scheduled_store();
    store.insert(ConfigKey::Mode, "TIMED");
    let clock = FakeClock::monday(20, 0);
    pumpcontrol::timer::reset(&store, clock.now(), TimeDelta::minutes(5)).unwrap();

    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(100);
    let mut sink = RecordingSink::new();

    assert!(cl.tick(&mut hw, &mut sink).running);
    clock.advance(TimeDelta::minutes(4));
    assert!(cl.tick(&mut hw, &mut sink).running);
    clock.advance(TimeDelta::minutes(1));
    assert!(!cl.tick(&mut hw, &mut sink).running);
}

// ── Fault tolerance ──────────────────────────────────────────

#[test]
fn broken_schedule_is_reported_and_not_desired() {
    let store = scheduled_store();
    store.insert(ConfigKey::Schedule, "Monday,09:00,12:00,11:00,14:00");
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(100);
    let mut sink = RecordingSink::new();

    let rec = cl.tick(&mut hw, &mut sink);
    assert!(!rec.running);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::DesireUnavailable {
            mode: OperatingMode::Scheduled,
            error: Error::Schedule(ScheduleError::OverlappingWindows { window: 1, .. }),
        }
    )));
}

#[test]
fn every_input_missing_still_completes_cycles() {
    let store = MemoryStore::new();
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(100);
    hw.fail_read = true;
    let mut sink = RecordingSink::new();

    for _ in 0..3 {
        let rec = cl.tick(&mut hw, &mut sink);
        assert!(!rec.running);
        assert_eq!(rec.mode, OperatingMode::Scheduled);
    }
    assert_eq!(cl.cycle_count(), 3);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SensorFault(_))), 3);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Cycle(_))), 3);
}

#[test]
fn shutdown_drives_pump_off() {
    let store = scheduled_store();
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(100);
    let mut sink = RecordingSink::new();

    cl.start(&mut sink);
    cl.tick(&mut hw, &mut sink);
    assert!(hw.pump_on());
    cl.shutdown(&mut hw, &mut sink);

    assert_eq!(hw.calls.last(), Some(&ActuatorCall::AllOff));
    assert!(!cl.pump_running());
    assert_eq!(sink.events.first(), Some(&AppEvent::Started(OperatingMode::Scheduled)));
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped));
}
