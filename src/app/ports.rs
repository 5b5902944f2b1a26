//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (relay outputs, input lines, RTC, event sinks, storage)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the domain core never touches hardware
//! directly and never pays for dynamic dispatch.

use chrono::NaiveDateTime;

use crate::clock::ClockReading;
use crate::config::SystemConfig;
use crate::error::ClockError;

use super::events::Notice;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Every digital output the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    Acc,
    Ignition,
    Starter,
    Lock,
    Unlock,
    Hazard,
    /// Dashboard "armed" indicator.
    Indicator,
    Lamp,
    Alarm,
    /// LED next to the start button.
    PowerLed,
}

impl Output {
    pub const COUNT: usize = 10;

    pub const ALL: [Output; Output::COUNT] = [
        Output::Acc,
        Output::Ignition,
        Output::Starter,
        Output::Lock,
        Output::Unlock,
        Output::Hazard,
        Output::Indicator,
        Output::Lamp,
        Output::Alarm,
        Output::PowerLed,
    ];

    /// Dense index for table-backed adapters.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Write-side port: the domain calls this to drive relays and LEDs.
pub trait ActuatorPort {
    /// Drive `output` high (`true`) or low.
    fn set_output(&mut self, output: Output, on: bool);

    /// Last level commanded on `output`.
    fn is_on(&self, output: Output) -> bool;

    /// De-assert every output — safe shutdown.
    fn all_off(&mut self) {
        for output in Output::ALL {
            self.set_output(output, false);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Logical input lines.  Adapters translate electrical polarity so that
/// `true` always means "asserted" (button held, remote channel active).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLine {
    Button,
    RemoteLock,
    RemoteUnlock,
    RemoteStart,
    RemoteAlarm,
}

impl InputLine {
    pub const COUNT: usize = 5;

    pub const ALL: [InputLine; InputLine::COUNT] = [
        InputLine::Button,
        InputLine::RemoteLock,
        InputLine::RemoteUnlock,
        InputLine::RemoteStart,
        InputLine::RemoteAlarm,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Read-side port: sampled once per tick.
pub trait InputPort {
    fn is_asserted(&mut self, line: InputLine) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Best-effort wall clock.
///
/// Implementations never fail on read: a missing or power-lost chip
/// yields a reading with `trusted == false` instead.
pub trait ClockPort {
    fn now(&mut self) -> ClockReading;

    /// Set the clock.  A successful set makes subsequent readings trusted.
    fn set(&mut self, datetime: NaiveDateTime) -> Result<(), ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → wireless link / log)
// ───────────────────────────────────────────────────────────────

/// The domain emits outward [`Notice`]s through this port.  Adapters
/// decide where they go (BLE notification, serial log, test recorder).
pub trait EventSink {
    fn emit(&mut self, notice: &Notice);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`SystemConfig`].
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if nothing is stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "storage I/O error"),
        }
    }
}
