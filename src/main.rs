//! Pump controller command-line entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   FileConfigStore  SystemClock │
//! │  (Level+Pump)      CsvRecordSink  (ConfigStore)    (Clock)     │
//! │                    TelemetrySink                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Hysteresis · ModeArbiter · Schedule · Timer           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `run` drives the loop.  Every other subcommand is an operator change
//! to the control directory, picked up by a running loop on its next
//! cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use pumpcontrol::adapters::csv_sink::CsvRecordSink;
use pumpcontrol::adapters::file_store::FileConfigStore;
use pumpcontrol::adapters::hardware::HardwareAdapter;
use pumpcontrol::adapters::log_sink::LogEventSink;
use pumpcontrol::adapters::thingspeak::{TelemetrySink, ThingSpeakClient};
use pumpcontrol::adapters::time::SystemClock;
use pumpcontrol::app::commands::OperatorCommand;
use pumpcontrol::app::ports::{Clock, ConfigKey, ConfigStore};
use pumpcontrol::app::service::ControlLoop;
use pumpcontrol::config::{SystemConfig, validate_config};
use pumpcontrol::drivers::sim_pin::{SimPin, SimTank};
use pumpcontrol::mode::OperatingMode;
use pumpcontrol::scheduler::{WEEKDAY_NAMES, WeeklySchedule};
use pumpcontrol::{manual, pins, timer};

// ── CLI definition ────────────────────────────────────────────

/// Level-gated transfer pump controller.
#[derive(Parser, Debug)]
#[command(name = "pumpcontrol", version, about, long_about = None)]
struct Cli {
    /// JSON settings file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the control directory from the settings
    #[arg(long, global = true)]
    control_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the control loop until SIGINT/SIGTERM
    Run {
        /// Simulated tank level in percent for the host pin backend
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        simulate_level: u8,
    },

    /// Select the operating mode (MANUAL, SCHEDULED, TIMED)
    Mode { mode: OperatingMode },

    /// Switch the manual override (on/off, 1/0, true/false)
    Manual {
        #[arg(value_parser = parse_switch_arg)]
        state: bool,
    },

    /// Set the turn-off threshold in percent (0-100)
    Threshold { percent: u8 },

    /// Set the hysteresis band width in percent (1-100)
    Hysteresis { percent: u8 },

    /// Countdown timer operations
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Weekly schedule operations
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Store the telemetry API key
    TelemetryKey { key: String },

    /// Print every control value as currently stored
    Status,
}

#[derive(Subcommand, Debug)]
enum TimerAction {
    /// Extend the timer (an expired timer counts from now)
    Add(DurationArgs),
    /// Shorten a running timer
    Subtract(DurationArgs),
    /// Restart the timer at the given duration from now
    Reset(DurationArgs),
    /// Print time remaining
    Show,
}

#[derive(Subcommand, Debug)]
enum ScheduleAction {
    /// Validate the stored schedule and print it
    Check,
    /// Validate a schedule file and install it
    Set { file: PathBuf },
}

#[derive(Args, Debug)]
struct DurationArgs {
    #[arg(long, default_value_t = 0)]
    days: u32,
    #[arg(long, default_value_t = 0)]
    hours: u32,
    #[arg(long, default_value_t = 0)]
    minutes: u32,
    #[arg(long, default_value_t = 0)]
    seconds: u32,
}

impl DurationArgs {
    fn to_delta(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.days))
            + TimeDelta::hours(i64::from(self.hours))
            + TimeDelta::minutes(i64::from(self.minutes))
            + TimeDelta::seconds(i64::from(self.seconds))
    }
}

fn parse_switch_arg(raw: &str) -> Result<bool, String> {
    manual::parse_switch(raw).ok_or_else(|| format!("expected on/off, got {raw:?}"))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SystemConfig::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SystemConfig::default(),
    };
    if let Some(dir) = cli.control_dir {
        config.control_dir = dir;
    }
    validate_config(&config).context("settings")?;

    let store = FileConfigStore::new(&config.control_dir);
    let clock = SystemClock::new();

    let command = match cli.command {
        Commands::Run { simulate_level } => return run(config, &store, clock, simulate_level),
        Commands::Status => return status(&store, &clock),
        Commands::Mode { mode } => OperatorCommand::SetMode(mode),
        Commands::Manual { state } => OperatorCommand::SetManual(state),
        Commands::Threshold { percent } => OperatorCommand::SetThreshold(percent),
        Commands::Hysteresis { percent } => OperatorCommand::SetHysteresis(percent),
        Commands::Timer { action } => match action {
            TimerAction::Show => return show_timer(&store, &clock),
            TimerAction::Add(d) => OperatorCommand::TimerAdd(d.to_delta()),
            TimerAction::Subtract(d) => OperatorCommand::TimerSubtract(d.to_delta()),
            TimerAction::Reset(d) => OperatorCommand::TimerReset(d.to_delta()),
        },
        Commands::Schedule { action } => match action {
            ScheduleAction::Check => return check_schedule(&store),
            ScheduleAction::Set { file } => OperatorCommand::SetSchedule(
                std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
            ),
        },
        Commands::TelemetryKey { key } => OperatorCommand::SetTelemetryKey(key),
    };

    let is_timer = matches!(
        command,
        OperatorCommand::TimerAdd(_)
            | OperatorCommand::TimerSubtract(_)
            | OperatorCommand::TimerReset(_)
    );
    command
        .apply(&store, clock.now())
        .context("operator command rejected")?;
    if is_timer {
        show_timer(&store, &clock)?;
    }
    Ok(())
}

// ── Control loop ──────────────────────────────────────────────

fn run(
    config: SystemConfig,
    store: &FileConfigStore,
    clock: SystemClock,
    simulate_level: u8,
) -> Result<()> {
    info!("pumpcontrol v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Hardware (fatal on failure) ────────────────────────
    // Probes beyond the board's assigned pins are labelled GPIO 0.
    let probe_gpios: Vec<u8> = (0..usize::from(config.probe_count))
        .map(|i| pins::LEVEL_PROBE_GPIOS.get(i).copied().unwrap_or(0))
        .collect();
    let tank = SimTank::new(&probe_gpios);
    tank.set_level_percent(simulate_level);
    info!("run: simulated pin backend, tank at {simulate_level}%");

    let mut hw = HardwareAdapter::init(
        tank.probe_pins(),
        SimPin::new(pins::PROBE_SEED_GPIO),
        SimPin::new(pins::PUMP_RELAY_GPIO),
        config.pump_active_low,
        SimPin::new(pins::STATUS_LED_GPIO),
    )
    .context("hardware initialisation")?;

    // ── 2. Shutdown flag ──────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("installing SIGTERM handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("installing SIGINT handler")?;

    // ── 3. Event sinks ────────────────────────────────────────
    let csv = match CsvRecordSink::create(&config.log_dir, clock.now()) {
        Ok(sink) => Some(sink),
        Err(e) => {
            warn!("run: CSV record disabled ({e})");
            None
        }
    };
    let telemetry = if config.telemetry.enabled {
        match ThingSpeakClient::new(&config.telemetry) {
            Ok(client) => Some(TelemetrySink::new(client, store)),
            Err(e) => {
                warn!("run: telemetry disabled ({e})");
                None
            }
        }
    } else {
        None
    };
    let mut sinks = (LogEventSink::new(), (csv, telemetry));

    // ── 4. Loop ───────────────────────────────────────────────
    let mut control = ControlLoop::new(config, store, clock);
    control.start(&mut sinks);
    control.run(&mut hw, &mut sinks, &shutdown);
    Ok(())
}

// ── Read-only views ───────────────────────────────────────────

fn show_timer(store: &FileConfigStore, clock: &SystemClock) -> Result<()> {
    let left = timer::read_remaining(store, clock.now()).context("reading timer")?;
    println!("timer: {}", timer::describe_remaining(left));
    Ok(())
}

fn check_schedule(store: &FileConfigStore) -> Result<()> {
    let schedule = WeeklySchedule::from_store(store).context("schedule rejected")?;
    for (day, name) in schedule.days().iter().zip(WEEKDAY_NAMES) {
        let windows: Vec<String> = day
            .windows()
            .iter()
            .map(|w| format!("{}-{}", w.start().format("%H:%M"), w.end().format("%H:%M")))
            .collect();
        if windows.is_empty() {
            println!("{name:<9} -");
        } else {
            println!("{name:<9} {}", windows.join(" "));
        }
    }
    Ok(())
}

fn status(store: &FileConfigStore, clock: &SystemClock) -> Result<()> {
    for key in ConfigKey::ALL {
        let shown = match (key, store.get(key)) {
            (ConfigKey::TelemetryKey, Ok(_)) => "(set)".to_owned(),
            (ConfigKey::Schedule, Ok(_)) => match WeeklySchedule::from_store(store) {
                Ok(_) => "valid".to_owned(),
                Err(e) => format!("INVALID: {e}"),
            },
            (ConfigKey::TimerExpiry, Ok(_)) => match timer::read_remaining(store, clock.now()) {
                Ok(left) => timer::describe_remaining(left),
                Err(e) => format!("unreadable: {e}"),
            },
            (_, Ok(v)) => v.trim().to_owned(),
            (_, Err(e)) => format!("unavailable: {e}"),
        };
        println!("{:<14} {}", key.name(), shown);
    }
    Ok(())
}
