//! Persisted countdown timer.
//!
//! The store holds a single absolute expiry instant as Unix seconds, so
//! the timer survives a restart with no checkpointing: whatever is left
//! is simply `expiry - now`.
//!
//! ```text
//!   expired ◀────────── now ──────────▶ running
//!                        │
//!      add(d):  expiry' = max(expiry, now) + d
//!      sub(d):  expiry' = expiry - d          (only while running)
//!    reset(d):  expiry' = now + d
//! ```
//!
//! An unreadable or corrupt expiry is treated as already expired.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use log::{info, warn};

use crate::app::ports::{ConfigKey, ConfigStore};
use crate::error::ConfigError;

/// Read the stored expiry instant.
pub fn read_expiry(store: &impl ConfigStore) -> Result<DateTime<Utc>, ConfigError> {
    let raw = store.get(ConfigKey::TimerExpiry)?;
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ConfigError::Parse {
            key: ConfigKey::TimerExpiry,
            value: trimmed.to_owned(),
        })
}

/// Time left until expiry.  Zero or negative once expired.
pub fn read_remaining(
    store: &impl ConfigStore,
    now: DateTime<FixedOffset>,
) -> Result<TimeDelta, ConfigError> {
    Ok(read_expiry(store)? - now.to_utc())
}

/// `true` while time is left on the timer.
pub fn is_desired(store: &impl ConfigStore, now: DateTime<FixedOffset>) -> Result<bool, ConfigError> {
    Ok(read_remaining(store, now)? > TimeDelta::zero())
}

/// Extend the timer by `d`.  An expired (or unreadable) timer is
/// re-based onto `now` first.  Returns the new expiry.
pub fn add(
    store: &impl ConfigStore,
    now: DateTime<FixedOffset>,
    d: TimeDelta,
) -> Result<DateTime<Utc>, ConfigError> {
    let now = now.to_utc();
    let base = match read_expiry(store) {
        Ok(expiry) => expiry.max(now),
        Err(e) => {
            warn!("Timer: {e}, counting from now");
            now
        }
    };
    write_expiry(store, shifted(base, d)?)
}

/// Shorten a running timer by `d`.  An expired timer is left untouched.
/// Returns the expiry now in force.
pub fn subtract(
    store: &impl ConfigStore,
    now: DateTime<FixedOffset>,
    d: TimeDelta,
) -> Result<DateTime<Utc>, ConfigError> {
    let now = now.to_utc();
    match read_expiry(store) {
        Ok(expiry) if expiry > now => write_expiry(store, shifted(expiry, -d)?),
        Ok(expiry) => Ok(expiry),
        Err(e) => {
            warn!("Timer: {e}, nothing to subtract from");
            Ok(now)
        }
    }
}

/// Discard prior state; expire `d` from `now`.
pub fn reset(
    store: &impl ConfigStore,
    now: DateTime<FixedOffset>,
    d: TimeDelta,
) -> Result<DateTime<Utc>, ConfigError> {
    write_expiry(store, shifted(now.to_utc(), d)?)
}

fn shifted(base: DateTime<Utc>, d: TimeDelta) -> Result<DateTime<Utc>, ConfigError> {
    base.checked_add_signed(d).ok_or(ConfigError::Invalid {
        key: ConfigKey::TimerExpiry,
        reason: "expiry out of range",
    })
}

fn write_expiry(store: &impl ConfigStore, expiry: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
    store.set(ConfigKey::TimerExpiry, &expiry.timestamp().to_string())?;
    info!("Timer: expiry set to {}", expiry.format("%Y-%m-%d %H:%M:%S UTC"));
    // Persisted at whole-second resolution; report what was stored.
    Ok(DateTime::from_timestamp(expiry.timestamp(), 0).unwrap_or(expiry))
}

/// Operator-facing rendering: `1d 02h 03m 04s`, or `expired`.
pub fn describe_remaining(left: TimeDelta) -> String {
    if left <= TimeDelta::zero() {
        return "expired".to_owned();
    }
    let secs = left.num_seconds();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (mins, secs) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{days}d {hours:02}h {mins:02}m {secs:02}s")
    } else {
        format!("{hours:02}h {mins:02}m {secs:02}s")
    }
}
