//! Unified error types for the remote-start firmware.
//!
//! Nothing here is fatal.  The controller drives physical actuators and
//! must stay responsive to the next command, so every failure is reported
//! outward as a status token and the component that produced it leaves its
//! state unchanged.  All variants are `Copy` so they can be returned from
//! the hot tick path without allocation.
//!
//! | Category              | Type           | Outward token      |
//! |-----------------------|----------------|--------------------|
//! | Interlock rejection   | [`Rejection`]  | `IGNORED:<ACTION>` |
//! | Malformed input       | [`CommandError`] | `INVALID:<ACTION>` / `UNKNOWN:<TEXT>` |
//! | Hardware unavailable  | [`ClockError`] | clock path suppressed |

use core::fmt;

// ---------------------------------------------------------------------------
// Interlock rejections
// ---------------------------------------------------------------------------

/// A request that conflicts with the current state.  Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Lock requested while already locked.
    AlreadyLocked,
    /// Unlock requested while already unlocked.
    AlreadyUnlocked,
    /// A lock/unlock solenoid pulse is still energised.
    PulseInFlight,
    /// The starter relay is held by another flow.
    StarterBusy,
    /// The engine is already flagged as running.
    EngineRunning,
    /// A start sequence is ramping (ACC/IG/starter stage).
    StartPending,
    /// A warm-up cycle is already running.
    WarmActive,
    /// The clock hardware refused or is missing.
    ClockUnavailable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyLocked => write!(f, "already locked"),
            Self::AlreadyUnlocked => write!(f, "already unlocked"),
            Self::PulseInFlight => write!(f, "door pulse in flight"),
            Self::StarterBusy => write!(f, "starter busy"),
            Self::EngineRunning => write!(f, "engine already on"),
            Self::StartPending => write!(f, "start already pending"),
            Self::WarmActive => write!(f, "warm-up already active"),
            Self::ClockUnavailable => write!(f, "clock unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Malformed input
// ---------------------------------------------------------------------------

/// Why a command token could not be turned into a [`Command`](crate::app::commands::Command).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs an argument and none was given.
    MissingArgument,
    /// The argument is not a number.
    InvalidNumber,
    /// The argument parsed but is outside the accepted range.
    OutOfRange,
    /// The argument is not `YYYY-MM-DD HH:MM:SS`.
    InvalidDateTime,
    /// `setrtc now` — refused, the clock must be set explicitly.
    Declined,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument => write!(f, "missing argument"),
            Self::InvalidNumber => write!(f, "argument is not a number"),
            Self::OutOfRange => write!(f, "argument out of range"),
            Self::InvalidDateTime => write!(f, "expected YYYY-MM-DD HH:MM:SS"),
            Self::Declined => write!(f, "refusing to set clock to 'now'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hardware unavailable
// ---------------------------------------------------------------------------

/// RTC failures.  The controller degrades to an untrusted clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// No RTC answered on the bus.
    NotPresent,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "RTC not present"),
        }
    }
}

impl From<ClockError> for Rejection {
    fn from(_: ClockError) -> Self {
        Self::ClockUnavailable
    }
}
