//! Per-run CSV record.
//!
//! One file per process start, named after the start time, with one
//! `Time;Level;Pump` row per control cycle.  Write-only; nothing reads
//! it back.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use log::{info, warn};

use crate::app::events::{AppEvent, CycleRecord};
use crate::app::ports::EventSink;

const HEADER: &str = "Time;Level;Pump";

pub struct CsvRecordSink {
    path: PathBuf,
    file: File,
}

impl CsvRecordSink {
    /// Create `<dir>/<started>.csv` and write the header row.
    pub fn create(dir: &Path, started: DateTime<FixedOffset>) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.csv", started.format("%Y-%m-%d_%H-%M-%S")));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{HEADER}")?;
        info!("CsvRecordSink: recording to {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `timestamp;level_fraction;0|1`.  An unknown level leaves its field empty.
pub fn format_row(record: &CycleRecord) -> String {
    let level = record
        .level
        .map(|l| l.fraction().to_string())
        .unwrap_or_default();
    format!(
        "{};{};{}",
        record.at.format("%Y-%m-%d %H:%M:%S%.6f"),
        level,
        u8::from(record.running)
    )
}

impl EventSink for CsvRecordSink {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Cycle(record) = event else {
            return;
        };
        if let Err(e) = writeln!(self.file, "{}", format_row(record)) {
            warn!("CsvRecordSink: cannot append to {}: {e}", self.path.display());
        }
    }
}
