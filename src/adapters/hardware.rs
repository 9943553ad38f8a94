//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the probe column and both actuator drivers, exposing them
//! through [`LevelPort`] and [`PumpPort`].  This is the only module in
//! the system that touches GPIO.  Any `embedded-hal` pin implementation
//! works; host runs use [`SimPin`](crate::drivers::sim_pin::SimPin).

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{LevelPort, PumpPort};
use crate::drivers::pump::PumpDriver;
use crate::drivers::status_led::StatusLed;
use crate::error::{ActuatorError, InitError, SensorError};
use crate::sensors::level::{LevelProbeArray, ProbeStates};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, O> {
    probes: LevelProbeArray<I, O>,
    pump: PumpDriver<O>,
    led: StatusLed<O>,
}

impl<I: InputPin, O: OutputPin> HardwareAdapter<I, O> {
    pub fn new(probes: LevelProbeArray<I, O>, pump: PumpDriver<O>, led: StatusLed<O>) -> Self {
        Self { probes, pump, led }
    }

    /// Claim every pin, leaving all outputs off.  Any failure here is
    /// fatal to startup.
    pub fn init(
        probe_pins: Vec<I>,
        seed: O,
        pump_pin: O,
        pump_active_low: bool,
        led_pin: O,
    ) -> Result<Self, InitError> {
        let probes = LevelProbeArray::new(probe_pins, seed)?;
        let pump = PumpDriver::new(pump_pin, pump_active_low)?;
        let led = StatusLed::new(led_pin)?;
        Ok(Self::new(probes, pump, led))
    }

    pub fn pump_running(&self) -> bool {
        self.pump.is_running()
    }
}

// ── LevelPort implementation ──────────────────────────────────

impl<I: InputPin, O: OutputPin> LevelPort for HardwareAdapter<I, O> {
    fn read_probes(&mut self) -> Result<ProbeStates, SensorError> {
        self.probes.read()
    }
}

// ── PumpPort implementation ───────────────────────────────────

impl<I: InputPin, O: OutputPin> PumpPort for HardwareAdapter<I, O> {
    fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pump.set(on)
    }

    fn heartbeat(&mut self) -> Result<(), ActuatorError> {
        self.led.toggle()
    }

    fn all_off(&mut self) {
        if let Err(e) = self.pump.stop() {
            warn!("HardwareAdapter: {e} during shutdown");
        }
        if let Err(e) = self.led.off() {
            warn!("HardwareAdapter: {e} during shutdown");
        }
    }
}
