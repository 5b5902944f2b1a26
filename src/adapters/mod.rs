//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                | Connects to                   |
//! |------------|---------------------------|-------------------------------|
//! | `hardware` | ActuatorPort, InputPort   | `embedded-hal` GPIO pins      |
//! | `log_sink` | EventSink                 | Serial log output             |
//! | `notify`   | EventSink                 | 20-byte chunked link / stdout |
//! | `nvs`      | ConfigPort                | NVS / in-memory store         |
//! | `rtc`      | ClockPort                 | Uptime-anchored soft clock    |
//! | `time`     | —                         | ESP32 system timer            |

pub mod hardware;
pub mod log_sink;
pub mod notify;
pub mod nvs;
pub mod rtc;
pub mod time;
