//! System configuration parameters
//!
//! Process-level settings for the pump controller.  These are fixed for
//! the life of the process and come from an optional JSON file passed
//! with `--config`; anything the file omits keeps its default.
//!
//! The operator-facing control values (threshold, mode, schedule, ...)
//! are *not* here: they live in the control directory and are re-read
//! every cycle through [`ConfigStore`](crate::app::ports::ConfigStore).
//! The threshold and band below are only the fallbacks used when those
//! files are unusable.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mode::OperatingMode;
use crate::sensors::level::MAX_PROBES;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Admission fallbacks ---
    /// Turn-off level (0-100%) used when the threshold file is unusable
    pub default_threshold_percent: u8,
    /// Band width (1-100%) used when the hysteresis file is unusable
    pub default_hysteresis_percent: u8,

    // --- Timing ---
    /// Pause between control cycles (seconds)
    pub poll_interval_secs: u32,

    // --- Mode ---
    /// Mode the arbiter holds until the mode file is first read
    pub initial_mode: OperatingMode,

    // --- Files ---
    /// Directory holding the operator control files
    pub control_dir: PathBuf,
    /// Directory receiving the per-run CSV record
    pub log_dir: PathBuf,

    // --- Hardware ---
    /// Number of level probes in the column
    pub probe_count: u8,
    /// Relay energises on a LOW output
    pub pump_active_low: bool,

    // --- Telemetry ---
    pub telemetry: TelemetryConfig,
}

/// Remote dashboard upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Update endpoint
    pub endpoint: String,
    /// Hard per-request timeout (seconds)
    pub timeout_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Admission
            default_threshold_percent: 20,
            default_hysteresis_percent: 20,

            // Timing
            poll_interval_secs: 30,

            // Mode
            initial_mode: OperatingMode::Scheduled,

            // Files
            control_dir: PathBuf::from("cfg"),
            log_dir: PathBuf::from("log"),

            // Hardware
            probe_count: 10,
            pump_active_low: true,

            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.thingspeak.com/update".to_owned(),
            timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    ValidationFailed(&'static str),
}

impl SystemConfig {
    /// Load and validate a JSON settings file.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&text)?;
        validate_config(&cfg)?;
        info!("SystemConfig: loaded {}", path.display());
        Ok(cfg)
    }
}

/// Range-check every field.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), SettingsError> {
    if cfg.default_threshold_percent > 100 {
        return Err(SettingsError::ValidationFailed(
            "default_threshold_percent must be 0–100",
        ));
    }
    if !(1..=100).contains(&cfg.default_hysteresis_percent) {
        return Err(SettingsError::ValidationFailed(
            "default_hysteresis_percent must be 1–100",
        ));
    }
    if !(1..=3600).contains(&cfg.poll_interval_secs) {
        return Err(SettingsError::ValidationFailed(
            "poll_interval_secs must be 1–3600",
        ));
    }
    if cfg.probe_count == 0 || usize::from(cfg.probe_count) > MAX_PROBES {
        return Err(SettingsError::ValidationFailed(
            "probe_count must be 1–32",
        ));
    }
    if cfg.telemetry.enabled {
        if !(1..=60).contains(&cfg.telemetry.timeout_secs) {
            return Err(SettingsError::ValidationFailed(
                "telemetry.timeout_secs must be 1–60",
            ));
        }
        let ep = cfg.telemetry.endpoint.as_str();
        if !(ep.starts_with("https://") || ep.starts_with("http://")) {
            return Err(SettingsError::ValidationFailed(
                "telemetry.endpoint must be an http(s) URL",
            ));
        }
    }
    Ok(())
}
