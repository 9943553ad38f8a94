//! Integration tests over a real control directory.
//!
//! The loop reads hand-written control files, picks up edits made
//! between cycles and records every cycle to the per-run CSV file.

use std::fs;

use pumpcontrol::adapters::csv_sink::CsvRecordSink;
use pumpcontrol::adapters::file_store::FileConfigStore;
use pumpcontrol::app::events::AppEvent;
use pumpcontrol::app::ports::{Clock, ConfigKey};
use pumpcontrol::app::service::ControlLoop;
use pumpcontrol::config::SystemConfig;
use pumpcontrol::mode::OperatingMode;

use crate::mock_hw::{FakeClock, MockHardware, RecordingSink};

fn write(dir: &std::path::Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn seeded_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "threshold.cfg", "30\n");
    write(dir.path(), "hysteresis.cfg", "10\n");
    write(dir.path(), "mode_selection.cfg", "SCHEDULED\n");
    write(dir.path(), "manual_pump_control.cfg", "0\n");
    write(dir.path(), "schedule.csv", "Monday,09:00,12:00\nTuesday\n");
    dir
}

#[test]
fn hand_written_files_drive_the_loop() {
    let dir = seeded_dir();
    // Trailing empty fields from a spreadsheet export are ignored.
    write(dir.path(), "schedule.csv", "Monday,09:00,12:00,,\nTuesday,,\n");
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(50);
    let mut sink = RecordingSink::new();

    let rec = cl.tick(&mut hw, &mut sink);
    assert_eq!((rec.low_threshold, rec.band), (30, 10));
    assert!(rec.desired);
    assert!(rec.running);
}

#[test]
fn malformed_schedule_row_is_not_desired() {
    let dir = seeded_dir();
    write(dir.path(), "schedule.csv", "Monday,09:00,12:00,13:00\n");
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut sink = RecordingSink::new();

    let rec = cl.tick(&mut MockHardware::at_percent(90), &mut sink);
    assert!(!rec.desired);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DesireUnavailable { .. })),
        1
    );
}

#[test]
fn edits_between_cycles_take_effect_next_cycle() {
    let dir = seeded_dir();
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(13, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(90);
    let mut sink = RecordingSink::new();

    assert!(!cl.tick(&mut hw, &mut sink).running);

    write(dir.path(), "mode_selection.cfg", "manual\n");
    write(dir.path(), "manual_pump_control.cfg", "1\n");
    let rec = cl.tick(&mut hw, &mut sink);
    assert_eq!(rec.mode, OperatingMode::Manual);
    assert!(rec.running);

    write(dir.path(), "threshold.cfg", "95\n");
    assert!(!cl.tick(&mut hw, &mut sink).running);
}

#[test]
fn deleted_threshold_file_keeps_last_good_value() {
    let dir = seeded_dir();
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(10, 0);
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(50);
    let mut sink = RecordingSink::new();
    cl.tick(&mut hw, &mut sink);

    fs::remove_file(dir.path().join("threshold.cfg")).unwrap();
    let rec = cl.tick(&mut hw, &mut sink);
    assert_eq!(rec.low_threshold, 30);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ConfigFallback { key: ConfigKey::Threshold, fallback, .. } if fallback == "30"
    )));
}

#[test]
fn timer_file_survives_a_restart() {
    let dir = seeded_dir();
    write(dir.path(), "mode_selection.cfg", "TIMED\n");
    let clock = FakeClock::monday(20, 0);
    {
        let store = FileConfigStore::new(dir.path());
        pumpcontrol::timer::reset(&store, clock.now(), chrono::TimeDelta::hours(1)).unwrap();
    }

    clock.advance(chrono::TimeDelta::minutes(30));
    let store = FileConfigStore::new(dir.path());
    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let rec = cl.tick(&mut MockHardware::at_percent(100), &mut RecordingSink::new());
    assert_eq!(rec.mode, OperatingMode::Timed);
    assert!(rec.running);
    assert_eq!(
        pumpcontrol::timer::read_remaining(&store, clock.now()),
        Ok(chrono::TimeDelta::minutes(30))
    );
}

#[test]
fn csv_record_gets_one_row_per_cycle() {
    let dir = seeded_dir();
    let log_dir = tempfile::tempdir().unwrap();
    let store = FileConfigStore::new(dir.path());
    let clock = FakeClock::monday(10, 0);
    let mut csv = CsvRecordSink::create(log_dir.path(), clock.now()).unwrap();

    let mut cl = ControlLoop::new(SystemConfig::default(), &store, &clock);
    let mut hw = MockHardware::at_percent(50);
    cl.tick(&mut hw, &mut csv);
    hw.fail_read = true;
    cl.tick(&mut hw, &mut csv);

    let path = csv.path().to_owned();
    assert!(path.ends_with("2024-01-01_10-00-00.csv"));
    drop(csv);
    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Time;Level;Pump");
    assert_eq!(lines[1], "2024-01-01 10:00:00.000000;0.5;1");
    assert_eq!(lines[2], "2024-01-01 10:00:00.000000;;0");
}
