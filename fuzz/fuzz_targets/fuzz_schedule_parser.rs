//! Fuzz target: `WeeklySchedule::parse`
//!
//! Feeds arbitrary text to the schedule parser.  It must never panic,
//! and anything it accepts must hold sorted, disjoint windows within
//! the per-day capacity.
//!
//! cargo fuzz run fuzz_schedule_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use pumpcontrol::scheduler::{MAX_WINDOWS_PER_DAY, WeeklySchedule};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(schedule) = WeeklySchedule::parse(text) else {
        return;
    };
    for day in schedule.days() {
        let windows = day.windows();
        assert!(windows.len() <= MAX_WINDOWS_PER_DAY);
        for w in windows {
            assert!(w.start() < w.end(), "inverted window accepted");
        }
        for pair in windows.windows(2) {
            assert!(pair[0].end() <= pair[1].start(), "overlap accepted");
        }
    }
});
