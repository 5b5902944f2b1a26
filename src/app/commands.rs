//! Inbound command grammar.
//!
//! Text arrives from the wireless link or the diagnostic console.  It is
//! trimmed and lower-cased, then matched against the keyword table.
//! Argument-taking keywords (`btncd`, `setrtc`, `hosttime`, `warmlen`,
//! `warmat`) accept the argument with or without a separating space, as in
//! `btncd 20000` or `btncd20000`.
//!
//! | Token                          | Command                       |
//! |--------------------------------|-------------------------------|
//! | `acc_on` / `acc_off`           | [`Command::Acc`]              |
//! | `ig_on` / `ig_off`             | [`Command::Ignition`]         |
//! | `start_the_car`                | [`Command::StartTheCar`]      |
//! | `starter_on`                   | [`Command::StarterPulse`]     |
//! | `alarm_on` / `alarm_off`       | [`Command::Alarm`]            |
//! | `lamp_on` / `lamp_off`         | [`Command::Lamp`]             |
//! | `lock` / `unlock`              | [`Command::Lock`] / [`Command::Unlock`] |
//! | `reset_all`                    | [`Command::ResetAll`]         |
//! | `btncd <5000-60000>`           | [`Command::SetCountdownWindow`] |
//! | `setrtc <datetime>`, `hosttime <datetime>` | [`Command::SetClock`] |
//! | `rtc`                          | [`Command::QueryClock`]       |
//! | `warm`                         | [`Command::ForceWarm`]        |
//! | `warmlen <1-60>` / `warmlen`   | [`Command::SetWarmDuration`] / [`Command::QueryWarmDuration`] |
//! | `warmat <HH:MM>` / `warmat`    | [`Command::SetWarmTime`] / [`Command::QueryWarmTime`] |

use core::fmt;

use chrono::NaiveDateTime;

use crate::clock::parse_datetime;
use crate::error::CommandError;
use crate::warmup::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};

pub const MIN_COUNTDOWN_WINDOW_MS: u32 = 5_000;
pub const MAX_COUNTDOWN_WINDOW_MS: u32 = 60_000;

/// Commands that external adapters can send into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Acc(bool),
    Ignition(bool),
    /// Full ACC → IG → crank → countdown sequence.
    StartTheCar,
    /// Bare 1000 ms starter pulse.
    StarterPulse,
    Alarm(bool),
    Lamp(bool),
    Lock,
    Unlock,
    ResetAll,
    SetCountdownWindow(u32),
    SetClock(NaiveDateTime),
    QueryClock,
    ForceWarm,
    SetWarmDuration(u8),
    QueryWarmDuration,
    /// Daily warm-up trigger, wall-clock hour and minute.
    SetWarmTime { hour: u8, minute: u8 },
    QueryWarmTime,
}

/// Upper-case action name used in `ACK:` / `IGNORED:` / `INVALID:` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AccOn,
    AccOff,
    IgOn,
    IgOff,
    StartTheCar,
    StarterOn,
    AlarmOn,
    AlarmOff,
    LampOn,
    LampOff,
    Lock,
    Unlock,
    ResetAll,
    ButtonCountdown,
    SetClock,
    ClockQuery,
    Warm,
    WarmLength,
    WarmAt,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccOn => "ACC_ON",
            Self::AccOff => "ACC_OFF",
            Self::IgOn => "IG_ON",
            Self::IgOff => "IG_OFF",
            Self::StartTheCar => "START_THE_CAR",
            Self::StarterOn => "STARTER_ON",
            Self::AlarmOn => "ALARM_ON",
            Self::AlarmOff => "ALARM_OFF",
            Self::LampOn => "LAMP_ON",
            Self::LampOff => "LAMP_OFF",
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
            Self::ResetAll => "RESET_ALL",
            Self::ButtonCountdown => "BTNCD",
            Self::SetClock => "SETRTC",
            Self::ClockQuery => "RTC",
            Self::Warm => "WARM",
            Self::WarmLength => "WARMLEN",
            Self::WarmAt => "WARMAT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    pub const fn action(&self) -> Action {
        match self {
            Self::Acc(true) => Action::AccOn,
            Self::Acc(false) => Action::AccOff,
            Self::Ignition(true) => Action::IgOn,
            Self::Ignition(false) => Action::IgOff,
            Self::StartTheCar => Action::StartTheCar,
            Self::StarterPulse => Action::StarterOn,
            Self::Alarm(true) => Action::AlarmOn,
            Self::Alarm(false) => Action::AlarmOff,
            Self::Lamp(true) => Action::LampOn,
            Self::Lamp(false) => Action::LampOff,
            Self::Lock => Action::Lock,
            Self::Unlock => Action::Unlock,
            Self::ResetAll => Action::ResetAll,
            Self::SetCountdownWindow(_) => Action::ButtonCountdown,
            Self::SetClock(_) => Action::SetClock,
            Self::QueryClock => Action::ClockQuery,
            Self::ForceWarm => Action::Warm,
            Self::SetWarmDuration(_) | Self::QueryWarmDuration => Action::WarmLength,
            Self::SetWarmTime { .. } | Self::QueryWarmTime => Action::WarmAt,
        }
    }
}

/// Why a line of text did not become a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No keyword matched.
    Unknown,
    /// Keyword matched, argument rejected.
    Malformed { action: Action, error: CommandError },
}

/// Parse one line of command text.
pub fn parse(text: &str) -> Result<Command, ParseError> {
    let normalized = text.trim().to_ascii_lowercase();
    let cmd = normalized.as_str();

    let plain = match cmd {
        "acc_on" => Some(Command::Acc(true)),
        "acc_off" => Some(Command::Acc(false)),
        "ig_on" => Some(Command::Ignition(true)),
        "ig_off" => Some(Command::Ignition(false)),
        "start_the_car" => Some(Command::StartTheCar),
        "starter_on" => Some(Command::StarterPulse),
        "alarm_on" => Some(Command::Alarm(true)),
        "alarm_off" => Some(Command::Alarm(false)),
        "lamp_on" => Some(Command::Lamp(true)),
        "lamp_off" => Some(Command::Lamp(false)),
        "lock" => Some(Command::Lock),
        "unlock" => Some(Command::Unlock),
        "reset_all" => Some(Command::ResetAll),
        "rtc" => Some(Command::QueryClock),
        "warm" => Some(Command::ForceWarm),
        _ => None,
    };
    if let Some(command) = plain {
        return Ok(command);
    }

    if let Some(arg) = argument(cmd, "btncd") {
        return parse_countdown(arg).map_err(|error| ParseError::Malformed {
            action: Action::ButtonCountdown,
            error,
        });
    }
    if let Some(arg) = argument(cmd, "warmlen") {
        if arg.is_empty() {
            return Ok(Command::QueryWarmDuration);
        }
        return parse_warm_minutes(arg).map_err(|error| ParseError::Malformed {
            action: Action::WarmLength,
            error,
        });
    }
    if let Some(arg) = argument(cmd, "warmat") {
        if arg.is_empty() {
            return Ok(Command::QueryWarmTime);
        }
        return parse_time_of_day(arg).map_err(|error| ParseError::Malformed {
            action: Action::WarmAt,
            error,
        });
    }
    if let Some(arg) = argument(cmd, "setrtc").or_else(|| argument(cmd, "hosttime")) {
        return parse_datetime(arg)
            .map(Command::SetClock)
            .map_err(|error| ParseError::Malformed {
                action: Action::SetClock,
                error,
            });
    }

    Err(ParseError::Unknown)
}

/// Strip `keyword` and return the trimmed remainder.
fn argument<'a>(cmd: &'a str, keyword: &str) -> Option<&'a str> {
    cmd.strip_prefix(keyword).map(str::trim)
}

fn parse_countdown(arg: &str) -> Result<Command, CommandError> {
    let ms = parse_number(arg)?;
    if !(MIN_COUNTDOWN_WINDOW_MS..=MAX_COUNTDOWN_WINDOW_MS).contains(&ms) {
        return Err(CommandError::OutOfRange);
    }
    Ok(Command::SetCountdownWindow(ms))
}

fn parse_warm_minutes(arg: &str) -> Result<Command, CommandError> {
    let minutes = parse_number(arg)?;
    let range = u32::from(MIN_DURATION_MINUTES)..=u32::from(MAX_DURATION_MINUTES);
    if !range.contains(&minutes) {
        return Err(CommandError::OutOfRange);
    }
    u8::try_from(minutes)
        .map(Command::SetWarmDuration)
        .map_err(|_| CommandError::OutOfRange)
}

/// `HH:MM`, 24-hour.
fn parse_time_of_day(arg: &str) -> Result<Command, CommandError> {
    let (hour, minute) = arg.split_once(':').ok_or(CommandError::InvalidNumber)?;
    let hour = parse_number(hour.trim())?;
    let minute = parse_number(minute.trim())?;
    if hour > 23 || minute > 59 {
        return Err(CommandError::OutOfRange);
    }
    Ok(Command::SetWarmTime {
        hour: hour as u8,
        minute: minute as u8,
    })
}

fn parse_number(arg: &str) -> Result<u32, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument);
    }
    if !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidNumber);
    }
    // All digits: the only failure left is overflow.
    arg.parse().map_err(|_| CommandError::OutOfRange)
}
