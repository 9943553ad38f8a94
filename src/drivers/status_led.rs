//! Heartbeat LED driver.
//!
//! One digital output, toggled once per control cycle so a glance at the
//! board shows the loop is alive.  Cosmetic only.

use embedded_hal::digital::OutputPin;

use crate::error::{ActuatorError, InitError};

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Result<Self, InitError> {
        let mut led = Self { pin, lit: true };
        led.set(false).map_err(|_| InitError::IndicatorUnavailable)?;
        Ok(led)
    }

    pub fn set(&mut self, lit: bool) -> Result<(), ActuatorError> {
        let res = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::IndicatorWriteFailed)?;
        self.lit = lit;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), ActuatorError> {
        self.set(!self.lit)
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set(false)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
