//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every notice to the ESP-IDF logger
//! (UART / USB-CDC in production).  Periodic broadcasts go out at debug
//! level so the console is not flooded every ten seconds.

use log::{debug, info, warn};

use crate::app::events::Notice;
use crate::app::ports::EventSink;

/// Adapter that logs every [`Notice`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, notice: &Notice) {
        match notice {
            Notice::Clock(_) | Notice::WarmRemaining(_) => debug!("TICK | {}", notice),
            Notice::Ignored(_) | Notice::Invalid(_) | Notice::Unknown(_) => {
                warn!("CMD | {}", notice);
            }
            Notice::Ack(_) | Notice::WarmDuration(_) | Notice::WarmTime(..) => {
                info!("CMD | {}", notice);
            }
            _ => info!("EVENT | {}", notice),
        }
    }
}
