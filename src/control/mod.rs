//! Level-based control laws.

pub mod hysteresis;
