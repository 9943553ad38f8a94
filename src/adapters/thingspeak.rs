//! ThingSpeak telemetry adapter.
//!
//! [`ThingSpeakClient`] implements [`TelemetryPublisher`] with a blocking
//! `reqwest` client bounded by a hard timeout.  [`TelemetrySink`] sits on
//! the [`EventSink`] side: for every completed cycle it re-reads the API
//! key from the control store and uploads one sample.
//!
//! Failures are logged and dropped.  Nothing is retried within a cycle
//! and nothing propagates back into the control loop.

use std::time::Duration;

use log::{debug, info, warn};

use crate::app::events::{AppEvent, TelemetrySample};
use crate::app::ports::{ConfigKey, ConfigStore, EventSink, TelemetryPublisher};
use crate::config::TelemetryConfig;
use crate::error::TelemetryError;

// ───────────────────────────────────────────────────────────────
// HTTP client
// ───────────────────────────────────────────────────────────────

pub struct ThingSpeakClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl ThingSpeakClient {
    pub fn new(cfg: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(u64::from(cfg.timeout_secs)))
            .build()
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
        })
    }
}

impl TelemetryPublisher for ThingSpeakClient {
    fn publish(&self, api_key: &str, sample: &TelemetrySample) -> Result<(), TelemetryError> {
        let form = update_form(api_key, sample);
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&form)
            .send()
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TelemetryError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp
            .text()
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;
        check_update_response(&body)
    }
}

/// Form fields of one update: `api_key`, `field1` = level %, `field2` = pump 0/1.
pub fn update_form(api_key: &str, sample: &TelemetrySample) -> [(&'static str, String); 3] {
    [
        ("api_key", api_key.to_owned()),
        ("field1", format!("{:.1}", sample.level_percent)),
        ("field2", u8::from(sample.pump_running).to_string()),
    ]
}

/// The service answers with the new entry id, or `0` when it refused
/// the update (bad key, rate limit).
pub fn check_update_response(body: &str) -> Result<(), TelemetryError> {
    match body.trim() {
        "0" | "" => Err(TelemetryError::Rejected),
        entry => {
            debug!("ThingSpeak: accepted as entry {entry}");
            Ok(())
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

pub struct TelemetrySink<P, S> {
    publisher: P,
    store: S,
    warned_unconfigured: bool,
}

impl<P: TelemetryPublisher, S: ConfigStore> TelemetrySink<P, S> {
    pub fn new(publisher: P, store: S) -> Self {
        Self {
            publisher,
            store,
            warned_unconfigured: false,
        }
    }

    fn upload(&mut self, sample: &TelemetrySample) -> Result<(), TelemetryError> {
        let key = self
            .store
            .get(ConfigKey::TelemetryKey)
            .ok()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .ok_or(TelemetryError::NotConfigured)?;
        self.publisher.publish(&key, sample)
    }
}

impl<P: TelemetryPublisher, S: ConfigStore> EventSink for TelemetrySink<P, S> {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Cycle(record) = event else {
            return;
        };
        let Some(sample) = TelemetrySample::from_record(record) else {
            debug!("TelemetrySink: no level this cycle, skipping upload");
            return;
        };
        match self.upload(&sample) {
            Ok(()) => {
                self.warned_unconfigured = false;
                info!(
                    "TelemetrySink: sent level={:.1}% pump={}",
                    sample.level_percent,
                    u8::from(sample.pump_running)
                );
            }
            Err(TelemetryError::NotConfigured) => {
                if !self.warned_unconfigured {
                    warn!("TelemetrySink: no API key, uploads skipped");
                    self.warned_unconfigured = true;
                }
            }
            Err(e) => warn!("TelemetrySink: upload failed: {e}"),
        }
    }
}
