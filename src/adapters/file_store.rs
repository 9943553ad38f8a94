//! Control-directory adapter.
//!
//! Implements [`ConfigStore`] over one plain-text file per key in the
//! control directory, the layout an operator (or any external form
//! handler) edits directly:
//!
//! | Key            | File                        |
//! |----------------|-----------------------------|
//! | `threshold`    | `threshold.cfg`             |
//! | `hysteresis`   | `hysteresis.cfg`            |
//! | `mode`         | `mode_selection.cfg`        |
//! | `manual`       | `manual_pump_control.cfg`   |
//! | `schedule`     | `schedule.csv`              |
//! | `timer`        | `timer.cfg`                 |
//! | `telemetry_key`| `thingspeak_key.cfg`        |
//!
//! # Atomic writes
//!
//! `set` writes a temporary file in the same directory and renames it
//! over the target, so the control loop never reads a half-written value
//! from this process.  External writers get no such guarantee; the loop
//! treats whatever it cannot parse as unusable for that cycle.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::ConfigError;

pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!("FileConfigStore: control directory {}", dir.display());
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: ConfigKey) -> PathBuf {
        self.dir.join(file_name(key))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        if !value.ends_with('\n') {
            temp.write_all(b"\n")?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

const fn file_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::Threshold => "threshold.cfg",
        ConfigKey::Hysteresis => "hysteresis.cfg",
        ConfigKey::Mode => "mode_selection.cfg",
        ConfigKey::Manual => "manual_pump_control.cfg",
        ConfigKey::Schedule => "schedule.csv",
        ConfigKey::TimerExpiry => "timer.cfg",
        ConfigKey::TelemetryKey => "thingspeak_key.cfg",
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: ConfigKey) -> Result<String, ConfigError> {
        let path = self.path_for(key);
        let value = fs::read_to_string(&path).map_err(|e| ConfigError::Read { key, kind: e.kind() })?;
        debug!("FileConfigStore: read {}", path.display());
        Ok(value)
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        self.write_atomic(&path, value)
            .map_err(|e| ConfigError::Write { key, kind: e.kind() })?;
        info!("FileConfigStore: wrote {}", path.display());
        Ok(())
    }
}
