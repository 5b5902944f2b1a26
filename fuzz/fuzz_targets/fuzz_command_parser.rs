//! Fuzz target: command text → `commands::parse` → `Controller`
//!
//! Splits arbitrary input into lines, parses each one and feeds the same
//! lines through a controller tick.  Asserts that parsing never panics,
//! that every line gets exactly one response, and that the starter is
//! never left on once a full reset has completed.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use chrono::NaiveDateTime;
use libfuzzer_sys::fuzz_target;
use remotestart::app::commands;
use remotestart::app::events::Notice;
use remotestart::app::ports::{
    ActuatorPort, ClockPort, EventSink, InputLine, InputPort, Output,
};
use remotestart::app::service::{Controller, RESET_GRACE_MS};
use remotestart::clock::ClockReading;
use remotestart::config::SystemConfig;
use remotestart::error::ClockError;
use remotestart::time::Instant;

#[derive(Default)]
struct Pins([bool; Output::COUNT]);

impl ActuatorPort for Pins {
    fn set_output(&mut self, output: Output, on: bool) {
        self.0[output.index()] = on;
    }

    fn is_on(&self, output: Output) -> bool {
        self.0[output.index()]
    }
}

impl InputPort for Pins {
    fn is_asserted(&mut self, _line: InputLine) -> bool {
        false
    }
}

struct Clock(ClockReading);

impl ClockPort for Clock {
    fn now(&mut self) -> ClockReading {
        self.0
    }

    fn set(&mut self, datetime: NaiveDateTime) -> Result<(), ClockError> {
        self.0 = ClockReading::trusted(datetime);
        Ok(())
    }
}

#[derive(Default)]
struct Count(usize);

impl EventSink for Count {
    fn emit(&mut self, _notice: &Notice) {
        self.0 += 1;
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let lines: Vec<&str> = text.lines().take(32).collect();
    for line in &lines {
        let _ = commands::parse(line);
    }

    let mut ctl = Controller::new(SystemConfig::default());
    let mut pins = Pins::default();
    let mut clock = Clock(ClockReading::untrusted());
    let mut sink = Count::default();
    let now = Instant::ZERO;
    ctl.start(now, &mut pins);

    for line in &lines {
        ctl.handle_text(line, now, &mut pins, &mut clock, &mut sink);
    }
    assert_eq!(sink.0, lines.len(), "one response per command line");

    ctl.tick(now, &mut pins, &mut clock, &mut sink, ["reset_all"]);
    ctl.tick(
        now + RESET_GRACE_MS,
        &mut pins,
        &mut clock,
        &mut sink,
        core::iter::empty::<&str>(),
    );
    assert!(!pins.is_on(Output::Starter), "starter left on after reset");
    assert!(!pins.is_on(Output::Ignition), "ignition left on after reset");
});
