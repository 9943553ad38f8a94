//! Simulated GPIO line for host runs and tests.
//!
//! A [`SimPin`] is one end of a shared logic level.  Cloning it yields
//! another handle on the *same* line, so a test (or the `--simulate-level`
//! front end) can hold one handle and watch or drive what the driver on
//! the other handle sees.
//!
//! Implements the `embedded-hal` 1.0 digital traits with an infallible
//! error type.

use core::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[derive(Debug, Clone)]
pub struct SimPin {
    gpio: u8,
    line: Arc<AtomicBool>,
}

impl SimPin {
    /// A new line, initially LOW.
    pub fn new(gpio: u8) -> Self {
        Self {
            gpio,
            line: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn gpio(&self) -> u8 {
        self.gpio
    }

    /// Current level of the line.
    pub fn level(&self) -> bool {
        self.line.load(Ordering::Relaxed)
    }

    /// Force the line level from outside the driver.
    pub fn drive(&self, high: bool) {
        self.line.store(high, Ordering::Relaxed);
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level())
    }
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// A probe column of simulated lines plus a seed line, with a handle to
/// set how many probes (from the bottom) read wet.
#[derive(Debug, Clone)]
pub struct SimTank {
    probes: Vec<SimPin>,
}

impl SimTank {
    pub fn new(gpios: &[u8]) -> Self {
        Self {
            probes: gpios.iter().map(|&g| SimPin::new(g)).collect(),
        }
    }

    /// Handles for the probe driver, bottom first.
    pub fn probe_pins(&self) -> Vec<SimPin> {
        self.probes.clone()
    }

    /// Wet the bottom `percent`% of the column (rounded down to whole probes).
    pub fn set_level_percent(&self, percent: u8) {
        let wet = self.probes.len() * usize::from(percent.min(100)) / 100;
        for (i, p) in self.probes.iter().enumerate() {
            p.drive(i < wet);
        }
    }
}
