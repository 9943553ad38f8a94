//! Concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `csv_sink`     | EventSink          | Per-run CSV file            |
//! | `file_store`   | ConfigStore        | Control directory files     |
//! | `hardware`     | LevelPort          | Probe GPIOs                 |
//! |                | PumpPort           | Relay and heartbeat GPIOs   |
//! | `log_sink`     | EventSink          | `log` facade                |
//! | `memory_store` | ConfigStore        | In-memory map (sim / tests) |
//! | `thingspeak`   | TelemetryPublisher | ThingSpeak HTTP API         |
//! |                | EventSink          |                             |
//! | `time`         | Clock              | System wall clock           |

pub mod csv_sink;
pub mod file_store;
pub mod hardware;
pub mod log_sink;
pub mod memory_store;
pub mod thingspeak;
pub mod time;
