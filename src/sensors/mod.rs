//! Sensor subsystem.
//!
//! The pump controller has a single sensor: the discrete level-probe
//! column in [`level`].  Its driver produces a raw [`ProbeStates`](level::ProbeStates)
//! sample each cycle; [`FillLevel::from_probes`](level::FillLevel::from_probes)
//! turns that into the normalised level the decision core works with.

pub mod level;
