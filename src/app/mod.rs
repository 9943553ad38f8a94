//! Application core: decision logic, no direct I/O.
//!
//! This module contains the control cycle of the pump controller: level
//! admission, mode arbitration and the operator commands that change the
//! persisted control values.  All interaction with hardware, files and
//! the network happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
