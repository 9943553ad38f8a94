//! Discrete tank-level probes.
//!
//! A vertical column of N conductive probes, ordered from the bottom of
//! the tank (index 0) to the top (index N−1).  A probe reads HIGH ("wet")
//! while it is submerged and the seed electrode is energised.
//!
//! The seed voltage is only applied for the duration of a sample to keep
//! electrolysis on the probes down.
//!
//! ## Reading model
//!
//! Only the highest wet probe matters.  A wet probe above a dry one is
//! electrically inconsistent (foam, splash, a fouled probe) but is
//! accepted as-is: the level degrades to the height of the highest wet
//! probe, never to an error.

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::error::{InitError, SensorError};

/// Maximum probes in one column (fixed-capacity readings, no heap).
pub const MAX_PROBES: usize = 32;

/// One sample of every probe, bottom first.
pub type ProbeStates = heapless::Vec<bool, MAX_PROBES>;

// ---------------------------------------------------------------------------
// FillLevel
// ---------------------------------------------------------------------------

/// Normalised tank fullness at a fixed discretisation of `steps`.
///
/// Kept as an exact `filled / steps` fraction so percent comparisons
/// against integer thresholds never suffer from float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillLevel {
    filled: u16,
    steps: u16,
}

impl FillLevel {
    /// Build a level of `filled` out of `steps`.  `None` if `steps` is zero
    /// or `filled` exceeds it.
    pub fn new(filled: u16, steps: u16) -> Option<Self> {
        (steps > 0 && filled <= steps).then_some(Self { filled, steps })
    }

    /// Convert a probe sample (bottom first) into a level.
    ///
    /// Scans from the top for the first wet probe.  All dry → 0, all wet
    /// → 1.  An empty sample reads as an empty tank.  A sample longer
    /// than `u16::MAX` is rescaled onto a `u16::MAX`-step grid.
    pub fn from_probes(probes: &[bool]) -> Self {
        let steps = probes.len().max(1);
        let filled = probes.iter().rposition(|&wet| wet).map_or(0, |top| top + 1);
        match (u16::try_from(filled), u16::try_from(steps)) {
            (Ok(filled), Ok(steps)) => Self { filled, steps },
            _ => {
                let scaled = filled as u128 * u128::from(u16::MAX) / steps as u128;
                Self {
                    filled: u16::try_from(scaled).unwrap_or(u16::MAX),
                    steps: u16::MAX,
                }
            }
        }
    }

    pub fn filled(self) -> u16 {
        self.filled
    }

    pub fn steps(self) -> u16 {
        self.steps
    }

    /// Level as a fraction in `[0.0, 1.0]`.
    pub fn fraction(self) -> f32 {
        f32::from(self.filled) / f32::from(self.steps)
    }

    /// Level in percent, `[0.0, 100.0]`.
    pub fn percent(self) -> f32 {
        self.fraction() * 100.0
    }

    /// `level * 100 < percent`, evaluated exactly.
    pub fn is_below_percent(self, percent: u16) -> bool {
        u32::from(self.filled) * 100 < u32::from(percent) * u32::from(self.steps)
    }

    /// `level * 100 >= percent`, evaluated exactly.
    pub fn is_at_least_percent(self, percent: u16) -> bool {
        !self.is_below_percent(percent)
    }
}

// ---------------------------------------------------------------------------
// Probe column driver
// ---------------------------------------------------------------------------

/// Probe inputs plus the seed-voltage output that energises them.
pub struct LevelProbeArray<I, O> {
    probes: Vec<I>,
    seed: O,
}

impl<I: InputPin, O: OutputPin> LevelProbeArray<I, O> {
    /// Take ownership of the probe pins (bottom first) and the seed output.
    ///
    /// The seed is driven low immediately; failure to do so, or a probe
    /// count outside `1..=MAX_PROBES`, is an initialisation error.
    pub fn new(probes: Vec<I>, mut seed: O) -> Result<Self, InitError> {
        if probes.is_empty() {
            return Err(InitError::ProbesUnavailable("no probe pins"));
        }
        if probes.len() > MAX_PROBES {
            return Err(InitError::ProbesUnavailable("too many probe pins"));
        }
        seed.set_low()
            .map_err(|_| InitError::ProbesUnavailable("seed output"))?;
        Ok(Self { probes, seed })
    }

    /// Number of probes in the column.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Energise the seed, sample every probe, de-energise.
    ///
    /// The seed is released even when a probe read fails.
    pub fn read(&mut self) -> Result<ProbeStates, SensorError> {
        self.seed
            .set_high()
            .map_err(|_| SensorError::SeedWriteFailed)?;

        let sampled: Result<ProbeStates, SensorError> = self
            .probes
            .iter_mut()
            .enumerate()
            .map(|(index, probe)| {
                probe
                    .is_high()
                    .map_err(|_| SensorError::ProbeReadFailed { index })
            })
            .collect();

        if self.seed.set_low().is_err() {
            warn!("LevelProbes: seed output stuck high after sampling");
        }

        let states = sampled?;
        debug!("LevelProbes: {:?}", states.as_slice());
        Ok(states)
    }
}
