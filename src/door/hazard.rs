//! Hazard-light choreography.
//!
//! | Mode              | Pattern                               |
//! |-------------------|---------------------------------------|
//! | `LockPattern`     | 400 on / 200 off / 400 on, then off   |
//! | `UnlockPattern`   | 1000 on, then off                     |
//! | `AlarmContinuous` | 200 on / 200 off until cancelled      |
//!
//! Exactly one mode runs at a time.  Starting a mode preempts whatever was
//! running and drives its first edge immediately.

use log::debug;

use crate::app::ports::{ActuatorPort, Output};
use crate::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardMode {
    Off,
    AlarmContinuous,
    LockPattern,
    UnlockPattern,
}

/// (level, hold_ms) per step; the pin goes low after the last step.
const LOCK_STEPS: &[(bool, u32)] = &[(true, 400), (false, 200), (true, 400)];
const UNLOCK_STEPS: &[(bool, u32)] = &[(true, 1000)];
const ALARM_HALF_PERIOD_MS: u32 = 200;

pub struct HazardChoreography {
    mode: HazardMode,
    step: usize,
    next_deadline: Instant,
}

impl HazardChoreography {
    pub const fn new() -> Self {
        Self {
            mode: HazardMode::Off,
            step: 0,
            next_deadline: Instant::ZERO,
        }
    }

    pub fn start(&mut self, mode: HazardMode, now: Instant, hw: &mut impl ActuatorPort) {
        if mode == HazardMode::Off {
            self.cancel(hw);
            return;
        }
        if self.mode != HazardMode::Off && self.mode != mode {
            debug!("hazard: {:?} preempted by {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.step = 0;
        self.advance(now, hw);
    }

    pub fn tick(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        if self.mode != HazardMode::Off && now.has_reached(self.next_deadline) {
            self.advance(now, hw);
        }
    }

    pub fn cancel(&mut self, hw: &mut impl ActuatorPort) {
        self.mode = HazardMode::Off;
        self.step = 0;
        hw.set_output(Output::Hazard, false);
    }

    pub fn mode(&self) -> HazardMode {
        self.mode
    }

    fn advance(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        let steps = match self.mode {
            HazardMode::Off => return,
            HazardMode::AlarmContinuous => {
                // Even steps high, odd steps low.
                let high = self.step % 2 == 0;
                hw.set_output(Output::Hazard, high);
                self.step = (self.step + 1) % 2;
                self.next_deadline = now + ALARM_HALF_PERIOD_MS;
                return;
            }
            HazardMode::LockPattern => LOCK_STEPS,
            HazardMode::UnlockPattern => UNLOCK_STEPS,
        };
        match steps.get(self.step) {
            Some(&(high, hold_ms)) => {
                hw.set_output(Output::Hazard, high);
                self.step += 1;
                self.next_deadline = now + hold_ms;
            }
            None => self.cancel(hw),
        }
    }
}

impl Default for HazardChoreography {
    fn default() -> Self {
        Self::new()
    }
}
