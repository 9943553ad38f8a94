//! GPIO pin assignments (BCM numbering) for the pump controller board.
//!
//! Single source of truth: drivers and the simulated backend label their
//! lines with these numbers rather than hard-coding them.

// ---------------------------------------------------------------------------
// Level probes
// ---------------------------------------------------------------------------

/// Seed-voltage output energising the probe column while it is sampled.
pub const PROBE_SEED_GPIO: u8 = 26;

/// Probe inputs, bottom of the tank first.  HIGH = submerged.
pub const LEVEL_PROBE_GPIOS: [u8; 10] = [4, 17, 27, 22, 23, 24, 25, 5, 6, 13];

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Pump relay.  The stock relay board is active LOW.
pub const PUMP_RELAY_GPIO: u8 = 20;

/// Heartbeat LED, toggled once per control cycle.
pub const STATUS_LED_GPIO: u8 = 21;
