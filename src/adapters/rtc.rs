//! Software real-time clock.
//!
//! Keeps wall-clock time as an offset from the 64-bit uptime counter:
//! `set` pins a calendar date/time to the current uptime, `now` adds the
//! elapsed milliseconds.  The 32-bit control-loop tick is not used here
//! because it wraps every ~49.7 days.  Until the first `set` every reading is
//! untrusted, which keeps the daily warm-up trigger disarmed after a
//! power cycle.  A battery-backed chip driver would implement the same
//! [`ClockPort`].

use chrono::{Duration, NaiveDateTime};
use log::info;

use crate::app::ports::ClockPort;
use crate::clock::ClockReading;
use crate::error::ClockError;

use super::time::MonotonicClock;

/// Source of "milliseconds since boot" for the soft clock.  Must not wrap.
pub trait Uptime {
    fn uptime_ms(&self) -> u64;
}

impl Uptime for MonotonicClock {
    fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

pub struct SoftRtc<U = MonotonicClock> {
    uptime: U,
    /// Wall-clock value pinned at `anchor`.
    base: Option<(NaiveDateTime, u64)>,
}

impl<U: Uptime> SoftRtc<U> {
    pub fn new(uptime: U) -> Self {
        Self { uptime, base: None }
    }

    pub fn is_set(&self) -> bool {
        self.base.is_some()
    }
}

impl<U: Uptime> ClockPort for SoftRtc<U> {
    fn now(&mut self) -> ClockReading {
        let Some((datetime, anchor)) = self.base else {
            return ClockReading::untrusted();
        };
        let elapsed = self.uptime.uptime_ms().saturating_sub(anchor);
        i64::try_from(elapsed)
            .ok()
            .and_then(Duration::try_milliseconds)
            .and_then(|offset| datetime.checked_add_signed(offset))
            .map_or_else(ClockReading::untrusted, ClockReading::trusted)
    }

    fn set(&mut self, datetime: NaiveDateTime) -> Result<(), ClockError> {
        self.base = Some((datetime, self.uptime.uptime_ms()));
        info!("RTC: set to {}", datetime);
        Ok(())
    }
}
