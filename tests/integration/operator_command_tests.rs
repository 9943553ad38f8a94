//! Integration tests for operator commands.
//!
//! Commands write through the control store; the loop only sees them on
//! its next cycle.

use chrono::TimeDelta;
use pumpcontrol::adapters::file_store::FileConfigStore;
use pumpcontrol::adapters::memory_store::MemoryStore;
use pumpcontrol::app::commands::OperatorCommand;
use pumpcontrol::app::events::AppEvent;
use pumpcontrol::app::ports::{Clock, ConfigKey, ConfigStore};
use pumpcontrol::app::service::ControlLoop;
use pumpcontrol::config::SystemConfig;
use pumpcontrol::error::{ConfigError, Error, ScheduleError};
use pumpcontrol::mode::OperatingMode;

use crate::mock_hw::{FakeClock, MockHardware, RecordingSink};

#[test]
fn manual_override_sequence() {
    let store = MemoryStore::new();
    let clock = FakeClock::monday(3, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(80);
    let mut sink = RecordingSink::new();

    OperatorCommand::SetThreshold(30).apply(&store, clock.now()).unwrap();
    OperatorCommand::SetHysteresis(10).apply(&store, clock.now()).unwrap();
    OperatorCommand::SetMode(OperatingMode::Manual).apply(&store, clock.now()).unwrap();
    OperatorCommand::SetManual(true).apply(&store, clock.now()).unwrap();
    assert!(cl.tick(&mut hw, &mut sink).running);

    OperatorCommand::SetManual(false).apply(&store, clock.now()).unwrap();
    assert!(!cl.tick(&mut hw, &mut sink).running);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpChanged { .. })),
        2
    );
}

#[test]
fn timer_commands_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(8, 0);
    let now = clock.now();

    OperatorCommand::TimerReset(TimeDelta::hours(1)).apply(&store, now).unwrap();
    OperatorCommand::TimerAdd(TimeDelta::minutes(30)).apply(&store, now).unwrap();
    OperatorCommand::TimerSubtract(TimeDelta::minutes(45)).apply(&store, now).unwrap();
    assert_eq!(
        pumpcontrol::timer::read_remaining(&store, now),
        Ok(TimeDelta::minutes(45))
    );

    OperatorCommand::SetMode(OperatingMode::Timed).apply(&store, now).unwrap();
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(100);
    let mut sink = RecordingSink::new();
    assert!(cl.tick(&mut hw, &mut sink).running);

    clock.advance(TimeDelta::minutes(45));
    assert!(!cl.tick(&mut hw, &mut sink).running);
}

#[test]
fn adding_to_an_expired_timer_counts_from_now() {
    let store = MemoryStore::new();
    let clock = FakeClock::monday(8, 0);
    OperatorCommand::TimerReset(TimeDelta::minutes(10))
        .apply(&store, clock.now())
        .unwrap();

    clock.advance(TimeDelta::hours(2));
    OperatorCommand::TimerSubtract(TimeDelta::minutes(5))
        .apply(&store, clock.now())
        .unwrap();
    OperatorCommand::TimerAdd(TimeDelta::minutes(15))
        .apply(&store, clock.now())
        .unwrap();
    assert_eq!(
        pumpcontrol::timer::read_remaining(&store, clock.now()),
        Ok(TimeDelta::minutes(15))
    );
}

#[test]
fn rejected_schedule_keeps_the_running_one() {
    let store = MemoryStore::new();
    let clock = FakeClock::monday(10, 0);
    OperatorCommand::SetSchedule("Monday,09:00,12:00".into())
        .apply(&store, clock.now())
        .unwrap();

    let err = OperatorCommand::SetSchedule("Monday,12:00,09:00".into())
        .apply(&store, clock.now())
        .unwrap_err();
    assert_eq!(
        err,
        Error::Schedule(ScheduleError::InvertedWindow {
            day: "Monday".into(),
            window: 0
        })
    );
    assert_eq!(store.get(ConfigKey::Schedule).unwrap(), "Monday,09:00,12:00");

    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    assert!(cl.tick(&mut MockHardware::at_percent(100), &mut RecordingSink::new()).desired);
}

#[test]
fn out_of_range_values_are_refused() {
    let store = MemoryStore::new();
    let now = FakeClock::monday(0, 0).now();

    for cmd in [
        OperatorCommand::SetThreshold(101),
        OperatorCommand::SetHysteresis(0),
        OperatorCommand::SetHysteresis(101),
        OperatorCommand::TimerReset(TimeDelta::seconds(-5)),
        OperatorCommand::SetTelemetryKey("   ".into()),
    ] {
        let err = cmd.apply(&store, now).unwrap_err();
        assert!(
            matches!(err, Error::Config(ConfigError::Invalid { .. })),
            "{cmd:?} gave {err:?}"
        );
    }
    for key in ConfigKey::ALL {
        assert!(store.get(key).is_err(), "{key} was written");
    }
}
