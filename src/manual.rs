//! Manual on/off override.

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::ConfigError;

/// Parse an operator-supplied switch value.
///
/// Accepts `1`/`0`, `true`/`false` and `on`/`off`, case-insensitively.
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Read the persisted manual state.
pub fn read(store: &impl ConfigStore) -> Result<bool, ConfigError> {
    let raw = store.get(ConfigKey::Manual)?;
    parse_switch(&raw).ok_or_else(|| ConfigError::Parse {
        key: ConfigKey::Manual,
        value: raw.trim().to_owned(),
    })
}

/// Persist the manual state in its canonical `0`/`1` form.
pub fn write(store: &impl ConfigStore, on: bool) -> Result<(), ConfigError> {
    store.set(ConfigKey::Manual, if on { "1" } else { "0" })
}
