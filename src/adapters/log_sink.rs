//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! structured line through the `log` facade.  The binary installs
//! `env_logger`; any other logger works the same.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(c) => {
                let level = c
                    .level_percent()
                    .map_or_else(|| "n/a".to_owned(), |p| format!("{p:.0}%"));
                info!(
                    "CYCLE | #{} | level={} | mode={} | T={}% B={}% | \
                     allowed={} desired={} | pump={}",
                    c.cycle,
                    level,
                    c.mode,
                    c.low_threshold,
                    c.band,
                    c.allowed,
                    c.desired,
                    if c.running { "ON" } else { "OFF" },
                );
            }
            AppEvent::PumpChanged { running } => {
                info!("PUMP | {}", if *running { "ON" } else { "OFF" });
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {from} -> {to}");
            }
            AppEvent::ModeRejected { kept, error } => {
                warn!("MODE | {error}, keeping {kept}");
            }
            AppEvent::ConfigFallback { key, error, fallback } => {
                warn!("CONFIG | {key}: {error}, using {fallback}");
            }
            AppEvent::DesireUnavailable { mode, error } => {
                warn!("DESIRE | {mode}: {error}");
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | {e}");
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | {e}");
            }
            AppEvent::Started(mode) => {
                info!("START | mode={mode}");
            }
            AppEvent::Stopped => {
                info!("STOP | pump off");
            }
        }
    }
}
