//! Weekly schedule evaluator.
//!
//! The schedule is a table of seven rows, Monday first.  Each row names
//! its day and lists zero or more `start,end` pairs of local `HH:MM`
//! times:
//!
//! ```text
//!   Monday,06:00,08:30,17:00,21:00
//!   Tuesday,06:00,08:30
//!   Wednesday
//!   ...
//! ```
//!
//! Rows are positional: row 0 is Monday no matter what its name field
//! says.  A blank line, or a row missing from the end of the table,
//! means "no windows".
//!
//! ```text
//!  Monday   ──[06:00 ████ 08:30)────────[17:00 ██████ 21:00)──
//!  Tuesday  ──[06:00 ████ 08:30)──────────────────────────────
//!  Wednesday ─────────────────────────────────────────────────
//! ```
//!
//! Windows are half-open: a window ending at 18:00 does not include
//! 18:00 itself, so back-to-back windows `[09:00, 12:00)` and
//! `[12:00, 14:00)` are legal and leave no gap.

use chrono::{Datelike, NaiveTime, Timelike};
use heapless::Vec as HVec;
use log::debug;

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::ScheduleError;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// Fixed per-day window capacity.
pub const MAX_WINDOWS_PER_DAY: usize = 16;

/// Row names used when a row is absent.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const TIME_FORMAT: &str = "%H:%M";

/// One `[start, end)` window of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    /// `None` unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Half-open containment.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t < self.end
    }
}

/// One validated row: sorted, disjoint windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    name: String,
    windows: HVec<TimeWindow, MAX_WINDOWS_PER_DAY>,
}

impl DaySchedule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        self.windows.iter().any(|w| w.contains(t))
    }

    /// Validate one raw row: `[name, start1, end1, start2, end2, ...]`.
    fn parse_row<S: AsRef<str>>(fields: &[S], index: usize) -> Result<Self, ScheduleError> {
        let name = fields
            .first()
            .map(|f| f.as_ref().trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(WEEKDAY_NAMES[index])
            .to_owned();
        let times = fields.get(1..).unwrap_or_default();

        if times.len() % 2 != 0 {
            return Err(ScheduleError::UnpairedWindow { day: name });
        }
        if times.len() / 2 > MAX_WINDOWS_PER_DAY {
            return Err(ScheduleError::TooManyWindows { day: name });
        }

        let mut windows = HVec::new();
        let mut prev_end: Option<NaiveTime> = None;
        for (window, pair) in times.chunks_exact(2).enumerate() {
            let start = parse_time(&name, pair[0].as_ref())?;
            let end = parse_time(&name, pair[1].as_ref())?;

            let Some(w) = TimeWindow::new(start, end) else {
                return Err(ScheduleError::InvertedWindow { day: name, window });
            };
            if prev_end.is_some_and(|pe| pe > start) {
                return Err(ScheduleError::OverlappingWindows { day: name, window });
            }
            prev_end = Some(end);

            if windows.push(w).is_err() {
                return Err(ScheduleError::TooManyWindows { day: name });
            }
        }

        Ok(Self { name, windows })
    }
}

fn parse_time(day: &str, raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| ScheduleError::InvalidTime {
        day: day.to_owned(),
        value: raw.to_owned(),
    })
}

// ═══════════════════════════════════════════════════════════════
//  Weekly schedule
// ═══════════════════════════════════════════════════════════════

/// Seven validated rows, Monday first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    /// Validate raw rows.  Each row is `[name, start1, end1, ...]`.
    ///
    /// Fails on the first violation found, scanning rows top to bottom
    /// and windows left to right.
    pub fn load<R, S>(rows: &[R]) -> Result<Self, ScheduleError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        if rows.len() > 7 {
            return Err(ScheduleError::TooManyDays { count: rows.len() });
        }

        let mut schedule = Self::default();
        for (index, day) in schedule.days.iter_mut().enumerate() {
            *day = match rows.get(index) {
                Some(row) => DaySchedule::parse_row(row.as_ref(), index)?,
                None => DaySchedule {
                    name: WEEKDAY_NAMES[index].to_owned(),
                    windows: HVec::new(),
                },
            };
        }
        Ok(schedule)
    }

    /// Parse the comma-separated text form.  Fields are trimmed and
    /// trailing empty fields (spreadsheet export artefacts) are dropped.
    ///
    /// A blank line inside the table is a day with no windows and keeps
    /// its position; only blank lines after the last row are ignored.
    pub fn parse(text: &str) -> Result<Self, ScheduleError> {
        let mut rows: Vec<Vec<&str>> = text
            .lines()
            .map(|line| {
                let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
                while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
                    fields.pop();
                }
                fields
            })
            .collect();
        while rows.last().is_some_and(|r| r.iter().all(|f| f.is_empty())) {
            rows.pop();
        }
        Self::load(&rows)
    }

    /// Read and validate the schedule held in the store.
    pub fn from_store(store: &impl ConfigStore) -> Result<Self, ScheduleError> {
        let text = store.get(ConfigKey::Schedule)?;
        Self::parse(&text)
    }

    /// Row for an ISO weekday, Monday = 0.
    pub fn day(&self, weekday: chrono::Weekday) -> &DaySchedule {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn days(&self) -> &[DaySchedule; 7] {
        &self.days
    }

    /// Is `now` inside one of today's windows?
    ///
    /// Window bounds are minute-resolution; `now` is compared at full
    /// resolution, so 11:59:59 is still inside a window ending at 12:00.
    pub fn is_desired<T>(&self, now: &T) -> bool
    where
        T: Datelike + Timelike,
    {
        let today = self.day(now.weekday());
        let Some(t) = NaiveTime::from_hms_nano_opt(now.hour(), now.minute(), now.second(), now.nanosecond())
        else {
            return false;
        };
        let desired = today.contains(t);
        debug!(
            "Scheduler: {} {} -> {}",
            today.name(),
            t.format("%H:%M:%S"),
            if desired { "in window" } else { "no window" }
        );
        desired
    }
}

/// Convenience: load from the store and evaluate.
pub fn is_desired<T>(store: &impl ConfigStore, now: &T) -> Result<bool, ScheduleError>
where
    T: Datelike + Timelike,
{
    Ok(WeeklySchedule::from_store(store)?.is_desired(now))
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
