//! Fuzz target: control-file readers
//!
//! Writes arbitrary text into every control value and reads it back the
//! way the loop does.  Readers must return a typed error or an in-range
//! value, never panic.
//!
//! cargo fuzz run fuzz_control_values

#![no_main]

use chrono::{FixedOffset, TimeZone};
use libfuzzer_sys::fuzz_target;
use pumpcontrol::adapters::memory_store::MemoryStore;
use pumpcontrol::app::ports::ConfigKey;
use pumpcontrol::control::hysteresis;
use pumpcontrol::mode::ModeArbiter;
use pumpcontrol::{manual, timer};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let store = MemoryStore::new();
    for key in ConfigKey::ALL {
        store.insert(key, &text);
    }

    if let Ok(t) = hysteresis::read_threshold(&store) {
        assert!(t <= 100);
    }
    if let Ok(b) = hysteresis::read_band(&store) {
        assert!((1..=100).contains(&b));
    }
    let _ = manual::read(&store);

    let Some(now) = FixedOffset::east_opt(0).and_then(|tz| tz.timestamp_opt(1_700_000_000, 0).single())
    else {
        return;
    };
    let _ = timer::read_remaining(&store, now);

    let mut arbiter = ModeArbiter::new(pumpcontrol::mode::OperatingMode::Scheduled);
    let _ = arbiter.refresh(&store);
    let _ = arbiter.desired(&store, now);
});
