//! Wall-clock readings and the plausibility gate.
//!
//! The RTC collaborator hands the core a [`ClockReading`]: a calendar
//! date/time plus the chip's own "this is trustworthy" flag (false after a
//! backup-battery loss or when the chip is absent).  Nothing time-of-day
//! driven may act on a reading that fails [`ClockReading::is_plausible`].

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::CommandError;

/// Earliest year accepted as a real clock value.
pub const MIN_PLAUSIBLE_YEAR: i32 = 2020;
/// Latest year accepted as a real clock value.
pub const MAX_PLAUSIBLE_YEAR: i32 = 2035;

/// Text reported in place of an untrusted reading.
pub const UNTRUSTED_TEXT: &str = "2000-01-01 00:00:00";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One best-effort reading of the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub datetime: NaiveDateTime,
    /// Chip-reported trust flag (false on lost power / missing hardware).
    pub trusted: bool,
}

impl ClockReading {
    pub fn trusted(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            trusted: true,
        }
    }

    /// A reading from a clock that is missing or has lost power.
    pub fn untrusted() -> Self {
        Self {
            datetime: NaiveDateTime::default(),
            trusted: false,
        }
    }

    /// Trusted by the chip *and* inside the sane year window.
    pub fn is_plausible(&self) -> bool {
        self.trusted && year_in_range(self.datetime.year())
    }

    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_plausible() {
            return f.write_str(UNTRUSTED_TEXT);
        }
        let dt = &self.datetime;
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        )
    }
}

fn year_in_range(year: i32) -> bool {
    (MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&year)
}

/// Parse `YYYY-MM-DD HH:MM:SS` for the `setrtc` / `hosttime` commands.
///
/// The literal `now` is refused: the firmware has no trustworthy source
/// to take "now" from, so the clock must be set explicitly.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime, CommandError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::MissingArgument);
    }
    if text.eq_ignore_ascii_case("now") {
        return Err(CommandError::Declined);
    }
    let dt = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map_err(|_| CommandError::InvalidDateTime)?;
    if !year_in_range(dt.year()) {
        return Err(CommandError::OutOfRange);
    }
    Ok(dt)
}
