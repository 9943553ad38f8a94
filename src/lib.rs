//! Pump controller library.
//!
//! Decides once per cycle whether a transfer pump should run, from a
//! discrete tank-level reading and one of three operating modes (manual,
//! weekly schedule, countdown timer).  Exposes the decision core, its
//! port traits and the host adapters for the binary and for integration
//! testing.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod manual;
pub mod mode;
pub mod pins;
pub mod scheduler;
pub mod timer;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;

pub use error::{Error, Result};
