//! Pump relay driver.
//!
//! A single digital output switching the pump relay.  The stock relay
//! board energises on a LOW input, so the driver translates "pump on"
//! into the right electrical level.
//!
//! ## Safety contract
//!
//! The pump must never run when the tank level does not allow it.  That
//! is enforced by the control loop; this driver is a dumb actuator.

use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, InitError};

pub struct PumpDriver<P> {
    pin: P,
    active_low: bool,
    running: bool,
}

impl<P: OutputPin> PumpDriver<P> {
    /// Take the relay pin and switch the pump off.
    pub fn new(pin: P, active_low: bool) -> Result<Self, InitError> {
        let mut drv = Self {
            pin,
            active_low,
            running: true,
        };
        drv.set(false).map_err(|_| InitError::PumpUnavailable)?;
        Ok(drv)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::PumpWriteFailed)?;
        self.running = on;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set(false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
