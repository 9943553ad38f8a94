//! Level-based pump admission with hysteresis.
//!
//! ```text
//!   100% ┬──────────────────────────────
//!        │        allowed while running
//!  T + B ┼─ ─ ─ ─ ─ ─ ─ ─ ─  ◀── turn-on edge (level ≥ T + B)
//!        │   band: previous state holds
//!      T ┼─ ─ ─ ─ ─ ─ ─ ─ ─  ◀── turn-off edge (level < T)
//!        │          never allowed
//!     0% ┴──────────────────────────────
//! ```
//!
//! Without the band a level hovering around `T` would toggle the relay
//! every cycle.  With it, the level must make a full excursion of `B`
//! percentage points before the decision can flip again.

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::config::SystemConfig;
use crate::error::ConfigError;
use crate::sensors::level::FillLevel;

/// The two admission parameters, both in integer percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionParams {
    /// Turn-off edge.  Valid range 0–100.
    pub low_threshold: u8,
    /// Band width above the turn-off edge.  Valid range 1–100.
    pub band: u8,
}

impl AdmissionParams {
    /// The configured defaults.
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            low_threshold: config.default_threshold_percent,
            band: config.default_hysteresis_percent,
        }
    }

    /// Turn-on edge, `low_threshold + band`.  May exceed 100, in which
    /// case a stopped pump can never be admitted.
    pub fn high_threshold(self) -> u16 {
        u16::from(self.low_threshold) + u16::from(self.band)
    }
}

/// Decide whether tank level permits the pump to run.
///
/// * `was_running`: stays allowed until `level * 100 < low_threshold`.
/// * otherwise: allowed once `level * 100 >= low_threshold + band`.
pub fn is_allowed(level: FillLevel, was_running: bool, params: AdmissionParams) -> bool {
    if was_running {
        !level.is_below_percent(u16::from(params.low_threshold))
    } else {
        level.is_at_least_percent(params.high_threshold())
    }
}

// ---------------------------------------------------------------------------
// Store access
// ---------------------------------------------------------------------------

/// Read and validate the low threshold.
pub fn read_threshold(store: &impl ConfigStore) -> Result<u8, ConfigError> {
    let value = read_percent(store, ConfigKey::Threshold)?;
    u8::try_from(value)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or(ConfigError::Invalid {
            key: ConfigKey::Threshold,
            reason: "threshold must be 0-100",
        })
}

/// Read and validate the band width.  Zero or negative is rejected.
pub fn read_band(store: &impl ConfigStore) -> Result<u8, ConfigError> {
    let value = read_percent(store, ConfigKey::Hysteresis)?;
    u8::try_from(value)
        .ok()
        .filter(|p| (1..=100).contains(p))
        .ok_or(ConfigError::Invalid {
            key: ConfigKey::Hysteresis,
            reason: "hysteresis band must be 1-100",
        })
}

fn read_percent(store: &impl ConfigStore, key: ConfigKey) -> Result<i64, ConfigError> {
    let raw = store.get(key)?;
    let trimmed = raw.trim();
    trimmed.parse::<i64>().map_err(|_| ConfigError::Parse {
        key,
        value: trimmed.to_owned(),
    })
}
