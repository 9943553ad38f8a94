//! Actuator drivers and the simulated GPIO backend.

pub mod pump;
pub mod sim_pin;
pub mod status_led;
