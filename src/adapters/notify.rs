//! Chunked notice delivery for small-MTU links.
//!
//! A BLE 4.x notification carries at most 20 bytes of payload, so every
//! outward token is split into [`NOTIFY_CHUNK_LEN`]-byte pieces and handed
//! to a [`NotifyTransport`] one at a time.  The receiver re-joins pieces
//! until [`NotifyTransport::finish`] marks the end of a token.
//!
//! ```text
//! "RTC:2025-03-14 15:31:00"  →  "RTC:2025-03-14 15:3" | "1:00"
//! ```

use log::{debug, warn};

use crate::app::events::Notice;
use crate::app::ports::EventSink;

/// Largest payload per notification.
pub const NOTIFY_CHUNK_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// No peer subscribed; the notice is dropped.
    NotConnected,
    /// The link refused the write.
    Io,
}

impl core::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "notify: no subscriber"),
            Self::Io => write!(f, "notify: link write failed"),
        }
    }
}

/// Byte pipe underneath the notifier (GATT characteristic, UART, test
/// recorder).
pub trait NotifyTransport {
    /// Send one chunk of at most [`NOTIFY_CHUNK_LEN`] bytes.
    fn send(&mut self, chunk: &[u8]) -> Result<(), NotifyError>;

    /// End of one token.
    fn finish(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// [`EventSink`] that renders each notice to text and streams it over a
/// [`NotifyTransport`] in fixed-size chunks.
pub struct ChunkedNotifier<T> {
    transport: T,
    dropped: u32,
}

impl<T: NotifyTransport> ChunkedNotifier<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dropped: 0,
        }
    }

    /// Notices lost because the link was down or refused a write.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send_token(&mut self, token: &str) -> Result<(), NotifyError> {
        if !self.transport.is_connected() {
            return Err(NotifyError::NotConnected);
        }
        for chunk in token.as_bytes().chunks(NOTIFY_CHUNK_LEN) {
            self.transport.send(chunk)?;
        }
        self.transport.finish()
    }
}

impl<T: NotifyTransport> EventSink for ChunkedNotifier<T> {
    fn emit(&mut self, notice: &Notice) {
        let token = notice.to_string();
        match self.send_token(&token) {
            Ok(()) => {}
            Err(NotifyError::NotConnected) => {
                self.dropped = self.dropped.wrapping_add(1);
                debug!("notify: no subscriber, dropped {}", token);
            }
            Err(e) => {
                self.dropped = self.dropped.wrapping_add(1);
                warn!("{} ({})", e, token);
            }
        }
    }
}

/// Line-oriented transport over stdout: chunks are written back to back
/// and each token ends with a newline.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

impl NotifyTransport for ConsoleTransport {
    fn send(&mut self, chunk: &[u8]) -> Result<(), NotifyError> {
        use std::io::Write;
        std::io::stdout()
            .write_all(chunk)
            .map_err(|_| NotifyError::Io)
    }

    fn finish(&mut self) -> Result<(), NotifyError> {
        use std::io::Write;
        let mut out = std::io::stdout();
        out.write_all(b"\n")
            .and_then(|()| out.flush())
            .map_err(|_| NotifyError::Io)
    }
}

/// Fans each notice out to two sinks, in order.
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, notice: &Notice) {
        self.0.emit(notice);
        self.1.emit(notice);
    }
}
