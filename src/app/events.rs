//! Outbound notices.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Their `Display` form is
//! the exact text token sent over the wireless link:
//!
//! | Notice                     | Token                       |
//! |----------------------------|-----------------------------|
//! | `Ack(a)`                   | `ACK:<ACTION>`              |
//! | `Ignored(a)`               | `IGNORED:<ACTION>`          |
//! | `Invalid(a)`               | `INVALID:<ACTION>`          |
//! | `Unknown(text)`            | `UNKNOWN:<TEXT>`            |
//! | `Locked` / `Unlocked`      | `LOCKED` / `UNLOCKED`       |
//! | `EngineRunning`            | `ENGINE:ON`                 |
//! | `StarterEngaged`           | `STARTER:ON`                |
//! | `WarmStarted` / `WarmDone` | `WARM:ON` / `WARM:DONE`     |
//! | `AllOff`                   | `ALL_OFF`                   |
//! | `WarmDuration(n)`          | `WARMLEN:<n>`               |
//! | `WarmTime(h, m)`           | `WARMAT:HH:MM`              |
//! | `Clock(r)`                 | `RTC:YYYY-MM-DD HH:MM:SS`   |
//! | `WarmRemaining(ms)`        | `WARM:HH:MM:SS`             |

use core::fmt;

use crate::clock::ClockReading;

use super::commands::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Ack(Action),
    Ignored(Action),
    Invalid(Action),
    /// Unrecognised text, echoed back trimmed.
    Unknown(String),
    Locked,
    Unlocked,
    EngineRunning,
    StarterEngaged,
    WarmStarted,
    WarmDone,
    /// Deferred half of a full reset completed.
    AllOff,
    WarmDuration(u8),
    /// Daily trigger time, hour and minute.
    WarmTime(u8, u8),
    Clock(ClockReading),
    /// Milliseconds left in the running warm-up.
    WarmRemaining(u32),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack(action) => write!(f, "ACK:{}", action),
            Self::Ignored(action) => write!(f, "IGNORED:{}", action),
            Self::Invalid(action) => write!(f, "INVALID:{}", action),
            Self::Unknown(text) => write!(f, "UNKNOWN:{}", text),
            Self::Locked => f.write_str("LOCKED"),
            Self::Unlocked => f.write_str("UNLOCKED"),
            Self::EngineRunning => f.write_str("ENGINE:ON"),
            Self::StarterEngaged => f.write_str("STARTER:ON"),
            Self::WarmStarted => f.write_str("WARM:ON"),
            Self::WarmDone => f.write_str("WARM:DONE"),
            Self::AllOff => f.write_str("ALL_OFF"),
            Self::WarmDuration(minutes) => write!(f, "WARMLEN:{}", minutes),
            Self::WarmTime(hour, minute) => write!(f, "WARMAT:{:02}:{:02}", hour, minute),
            Self::Clock(reading) => write!(f, "RTC:{}", reading),
            Self::WarmRemaining(ms) => {
                let secs = ms / 1000;
                write!(
                    f,
                    "WARM:{:02}:{:02}:{:02}",
                    secs / 3600,
                    (secs / 60) % 60,
                    secs % 60
                )
            }
        }
    }
}
