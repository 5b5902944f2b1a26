//! Mock adapters for integration tests.
//!
//! Records every output write so tests can assert on the full history
//! without touching real GPIO, and lets tests drive the input lines and
//! the wall clock directly.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use chrono::{NaiveDate, NaiveDateTime};
use remotestart::app::events::Notice;
use remotestart::app::ports::{
    ActuatorPort, ClockPort, ConfigError, ConfigPort, EventSink, InputLine, InputPort, Output,
};
use remotestart::app::service::Controller;
use remotestart::clock::ClockReading;
use remotestart::config::SystemConfig;
use remotestart::error::ClockError;
use remotestart::time::Instant;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    levels: [bool; Output::COUNT],
    inputs: [bool; InputLine::COUNT],
    /// Every level change, in order.
    pub writes: Vec<(Output, bool)>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, line: InputLine, asserted: bool) {
        self.inputs[line.index()] = asserted;
    }

    /// Whether `output` was ever driven high.
    pub fn was_driven(&self, output: Output) -> bool {
        self.writes.iter().any(|&(o, on)| o == output && on)
    }

    /// Count of rising edges on `output`.
    pub fn rising_edges(&self, output: Output) -> usize {
        self.writes
            .iter()
            .filter(|&&(o, on)| o == output && on)
            .count()
    }

    pub fn clear_history(&mut self) {
        self.writes.clear();
    }
}

impl ActuatorPort for MockHardware {
    fn set_output(&mut self, output: Output, on: bool) {
        if self.levels[output.index()] != on {
            self.writes.push((output, on));
        }
        self.levels[output.index()] = on;
    }

    fn is_on(&self, output: Output) -> bool {
        self.levels[output.index()]
    }
}

impl InputPort for MockHardware {
    fn is_asserted(&mut self, line: InputLine) -> bool {
        self.inputs[line.index()]
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Wall clock frozen at whatever the test sets.  `present == false`
/// simulates a missing chip.
pub struct MockClock {
    pub reading: ClockReading,
    pub present: bool,
}

impl MockClock {
    pub fn untrusted() -> Self {
        Self {
            reading: ClockReading::untrusted(),
            present: true,
        }
    }

    pub fn at(datetime: NaiveDateTime) -> Self {
        Self {
            reading: ClockReading::trusted(datetime),
            present: true,
        }
    }

    pub fn set_time(&mut self, datetime: NaiveDateTime) {
        self.reading = ClockReading::trusted(datetime);
    }
}

impl ClockPort for MockClock {
    fn now(&mut self) -> ClockReading {
        self.reading
    }

    fn set(&mut self, datetime: NaiveDateTime) -> Result<(), ClockError> {
        if !self.present {
            return Err(ClockError::NotPresent);
        }
        self.reading = ClockReading::trusted(datetime);
        Ok(())
    }
}

pub fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .and_then(|date| date.and_hms_opt(h, mi, s))
        .unwrap()
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub notices: Vec<Notice>,
}

impl RecordingSink {
    pub fn tokens(&self) -> Vec<String> {
        self.notices.iter().map(ToString::to_string).collect()
    }

    pub fn take_tokens(&mut self) -> Vec<String> {
        let tokens = self.tokens();
        self.notices.clear();
        tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.notices.iter().any(|n| n.to_string() == token)
    }

    pub fn count(&self, token: &str) -> usize {
        self.notices.iter().filter(|n| n.to_string() == token).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

// ── MockConfigStore ───────────────────────────────────────────

#[derive(Default)]
pub struct MockConfigStore {
    pub saved: RefCell<Option<SystemConfig>>,
    pub saves: Cell<u32>,
    pub fail: bool,
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.fail {
            return Err(ConfigError::IoError);
        }
        config.validate()?;
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Controller plus mocks, stepped in fixed 10 ms ticks.
pub struct Rig {
    pub ctl: Controller,
    pub hw: MockHardware,
    pub clock: MockClock,
    pub sink: RecordingSink,
    pub now: Instant,
}

pub const TICK_MS: u32 = 10;

impl Rig {
    pub fn new() -> Self {
        Self::with(SystemConfig::default(), MockClock::untrusted())
    }

    pub fn with(config: SystemConfig, clock: MockClock) -> Self {
        Self::starting_at(config, clock, Instant::ZERO)
    }

    pub fn starting_at(config: SystemConfig, clock: MockClock, now: Instant) -> Self {
        let mut ctl = Controller::new(config);
        let mut hw = MockHardware::new();
        ctl.start(now, &mut hw);
        hw.clear_history();
        Self {
            ctl,
            hw,
            clock,
            sink: RecordingSink::default(),
            now,
        }
    }

    /// One tick at the current time with the given command lines.
    pub fn tick_with(&mut self, commands: &[&str]) {
        self.ctl.tick(
            self.now,
            &mut self.hw,
            &mut self.clock,
            &mut self.sink,
            commands.iter(),
        );
    }

    /// Send one command on the current tick, then advance one tick.
    pub fn send(&mut self, command: &str) {
        self.tick_with(&[command]);
        self.now = self.now + TICK_MS;
    }

    /// Tick without commands until `ms` have elapsed.
    pub fn run_for(&mut self, ms: u32) {
        let end = self.now + ms;
        while !self.now.has_reached(end) {
            self.tick_with(&[]);
            self.now = self.now + TICK_MS;
        }
    }

    /// Tick without commands up to and including absolute time `ms`.
    pub fn run_until(&mut self, ms: u32) {
        let end = Instant::from_millis(ms);
        while end.has_reached(self.now) {
            self.tick_with(&[]);
            self.now = self.now + TICK_MS;
        }
    }

    /// Hold `line` asserted for `ms`, then release it.
    pub fn pulse_input(&mut self, line: InputLine, ms: u32) {
        self.hw.set_input(line, true);
        self.run_for(ms);
        self.hw.set_input(line, false);
        self.run_for(TICK_MS);
    }

    pub fn level(&self, output: Output) -> bool {
        self.hw.is_on(output)
    }
}
