//! Square-wave blink primitive shared by every blinking output.
//!
//! One [`Blinker`] drives one [`Output`].  The owning component calls
//! [`Blinker::tick`] once per control cycle; the blinker toggles the pin
//! when its deadline passes and schedules the next edge from the current
//! cadence.
//!
//! ## Cadences
//!
//! | Cadence     | High   | Low     | Used by                               |
//! |-------------|--------|---------|---------------------------------------|
//! | `SLOW`      | 500 ms | 500 ms  | power LED, idle / engine running      |
//! | `FAST`      | 200 ms | 50 ms   | power LED, starter cranking/countdown |
//! | `ARMED`     | 300 ms | 3000 ms | dashboard indicator, locked + engine off |
//! | `ALARM`     | 200 ms | 200 ms  | siren output, hazard alarm mode       |
//!
//! Changing the cadence of a running blinker does not restart its phase:
//! the new timing applies from the next edge.

use crate::app::ports::{ActuatorPort, Output};
use crate::time::Instant;

/// High/low durations of a square wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub high_ms: u32,
    pub low_ms: u32,
}

impl Cadence {
    pub const SLOW: Self = Self::new(500, 500);
    pub const FAST: Self = Self::new(200, 50);
    pub const ARMED: Self = Self::new(300, 3000);
    pub const ALARM: Self = Self::new(200, 200);

    pub const fn new(high_ms: u32, low_ms: u32) -> Self {
        Self { high_ms, low_ms }
    }

    const fn phase_ms(self, high: bool) -> u32 {
        if high { self.high_ms } else { self.low_ms }
    }
}

/// Non-blocking blinker for a single output.  No heap.
#[derive(Debug)]
pub struct Blinker {
    output: Output,
    cadence: Option<Cadence>,
    high: bool,
    next_toggle: Instant,
}

impl Blinker {
    pub const fn new(output: Output) -> Self {
        Self {
            output,
            cadence: None,
            high: false,
            next_toggle: Instant::ZERO,
        }
    }

    /// Start blinking with `cadence`, or retime an already running blink.
    ///
    /// A stopped blinker drives its output high immediately.
    pub fn set_cadence(&mut self, cadence: Cadence, now: Instant, hw: &mut impl ActuatorPort) {
        if self.cadence.is_none() {
            self.high = true;
            hw.set_output(self.output, true);
            self.next_toggle = now + cadence.high_ms;
        }
        self.cadence = Some(cadence);
    }

    /// Stop blinking and drive the output low.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort) {
        self.cadence = None;
        self.high = false;
        hw.set_output(self.output, false);
    }

    /// Toggle the output if the current phase has elapsed.
    pub fn tick(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        let Some(cadence) = self.cadence else {
            return;
        };
        if now.has_reached(self.next_toggle) {
            self.high = !self.high;
            hw.set_output(self.output, self.high);
            self.next_toggle = now + cadence.phase_ms(self.high);
        }
    }

    pub fn is_running(&self) -> bool {
        self.cadence.is_some()
    }

    pub fn cadence(&self) -> Option<Cadence> {
        self.cadence
    }
}
