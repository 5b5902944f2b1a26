//! Inbound command channel.
//!
//! Uses an `embassy-sync` bounded channel to bridge the contexts that
//! receive command text (wireless-link write callback, console reader
//! thread) with the synchronous control loop.  Producers never block:
//! a full channel drops the command and reports it to the caller.
//!
//! ```text
//! ┌──────────────┐  CommandText  ┌──────────────┐
//! │ Link / UART  │──────────────▶│ Control Loop │  drained once per tick
//! └──────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

/// Longest command accepted (`setrtc YYYY-MM-DD HH:MM:SS` is 26 bytes).
pub const COMMAND_MAX_LEN: usize = 64;

/// Channel depth for inbound commands.
pub const COMMAND_DEPTH: usize = 8;

pub type CommandText = String<COMMAND_MAX_LEN>;

pub type CommandChannel = Channel<CriticalSectionRawMutex, CommandText, COMMAND_DEPTH>;

/// Inbound command channel: producers → control loop.
pub static COMMAND_CHANNEL: CommandChannel = Channel::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Text longer than [`COMMAND_MAX_LEN`].
    TooLong,
    /// Control loop is behind; command dropped.
    Full,
}

impl core::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooLong => write!(f, "command too long"),
            Self::Full => write!(f, "command queue full"),
        }
    }
}

/// Queue one line of command text without blocking.
pub fn submit(channel: &CommandChannel, text: &str) -> Result<(), SubmitError> {
    let mut msg = CommandText::new();
    msg.push_str(text.trim()).map_err(|()| SubmitError::TooLong)?;
    channel.try_send(msg).map_err(|_| SubmitError::Full)
}

/// Take everything queued since the last tick.
pub fn drain(channel: &CommandChannel) -> Vec<CommandText, COMMAND_DEPTH> {
    let mut out = Vec::new();
    while let Ok(msg) = channel.try_receive() {
        if out.push(msg).is_err() {
            break;
        }
    }
    out
}
