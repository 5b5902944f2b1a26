//! Siren output: 200/200 ms square wave while on.

use log::info;

use crate::app::ports::{ActuatorPort, Output};
use crate::drivers::blink::{Blinker, Cadence};
use crate::time::Instant;

pub struct AlarmController {
    blinker: Blinker,
}

impl AlarmController {
    pub const fn new() -> Self {
        Self {
            blinker: Blinker::new(Output::Alarm),
        }
    }

    /// Returns `true` if the state changed.
    pub fn set(&mut self, on: bool, now: Instant, hw: &mut impl ActuatorPort) -> bool {
        if on == self.is_on() {
            return false;
        }
        if on {
            self.blinker.set_cadence(Cadence::ALARM, now, hw);
        } else {
            self.blinker.stop(hw);
        }
        info!("alarm: {}", if on { "on" } else { "off" });
        true
    }

    /// Force the siren low regardless of state.
    pub fn off(&mut self, hw: &mut impl ActuatorPort) {
        if self.is_on() {
            info!("alarm: off");
        }
        self.blinker.stop(hw);
    }

    pub fn tick(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        self.blinker.tick(now, hw);
    }

    pub fn is_on(&self) -> bool {
        self.blinker.is_running()
    }
}

impl Default for AlarmController {
    fn default() -> Self {
        Self::new()
    }
}
