//! Door actuator: lock/unlock solenoid pulses, hazard choreography, siren
//! and the dashboard "armed" indicator.
//!
//! ```text
//!   lock_pulse()                 600 ms               tick()
//!   ───────────▶ UNLOCK low ──▶ LOCK high ──────────▶ LOCK low
//!                                                     locked = true
//!                                                     Locked event
//!                                                     LockPattern hazard
//!                                                     indicator 300/3000 (engine off)
//! ```
//!
//! `locked` only changes when a pulse completes, never when it starts, so
//! the reported state is never ahead of the mechanism.  At most one pulse
//! is in flight.

pub mod alarm;
pub mod hazard;

use log::{info, warn};

use crate::app::ports::{ActuatorPort, Output};
use crate::drivers::blink::{Blinker, Cadence};
use crate::error::Rejection;
use crate::time::Instant;

use alarm::AlarmController;
use hazard::{HazardChoreography, HazardMode};

/// Solenoid energise time.
pub const SOLENOID_PULSE_MS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Lock,
    Unlock,
}

impl Direction {
    const fn pin(self) -> Output {
        match self {
            Self::Lock => Output::Lock,
            Self::Unlock => Output::Unlock,
        }
    }
}

/// Completed pulse, reported by [`DoorActuator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    direction: Direction,
    deadline: Instant,
}

pub struct DoorActuator {
    locked: bool,
    pulse: Option<Pulse>,
    engine_on: bool,
    indicator: Blinker,
    hazard: HazardChoreography,
    alarm: AlarmController,
}

impl DoorActuator {
    pub const fn new() -> Self {
        Self {
            locked: false,
            pulse: None,
            engine_on: false,
            indicator: Blinker::new(Output::Indicator),
            hazard: HazardChoreography::new(),
            alarm: AlarmController::new(),
        }
    }

    pub fn lock_pulse(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Result<(), Rejection> {
        if self.locked {
            return Err(Rejection::AlreadyLocked);
        }
        self.begin_pulse(Direction::Lock, now, hw)
    }

    pub fn unlock_pulse(
        &mut self,
        now: Instant,
        hw: &mut impl ActuatorPort,
    ) -> Result<(), Rejection> {
        if !self.locked {
            return Err(Rejection::AlreadyUnlocked);
        }
        self.begin_pulse(Direction::Unlock, now, hw)
    }

    /// Complete an expired pulse and advance the blink patterns.
    pub fn tick(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Option<DoorEvent> {
        let event = match self.pulse {
            Some(pulse) if now.has_reached(pulse.deadline) => {
                self.pulse = None;
                Some(self.complete(pulse.direction, now, hw))
            }
            _ => None,
        };
        self.indicator.tick(now, hw);
        self.hazard.tick(now, hw);
        self.alarm.tick(now, hw);
        event
    }

    /// Drop any pulse, hazard pattern and alarm immediately.  The lock
    /// state and indicator are left as they are.
    pub fn cancel_all(&mut self, hw: &mut impl ActuatorPort) {
        if let Some(pulse) = self.pulse.take() {
            warn!("door: {:?} pulse cancelled", pulse.direction);
        }
        hw.set_output(Output::Lock, false);
        hw.set_output(Output::Unlock, false);
        self.hazard.cancel(hw);
        self.alarm.off(hw);
    }

    /// Stop the hazard flasher and the siren, leaving coils alone.
    pub fn silence(&mut self, hw: &mut impl ActuatorPort) {
        self.hazard.cancel(hw);
        self.alarm.off(hw);
    }

    /// Engine off while locked arms the indicator; engine on clears it.
    pub fn set_engine_state(&mut self, on: bool, now: Instant, hw: &mut impl ActuatorPort) {
        self.engine_on = on;
        self.refresh_indicator(now, hw);
    }

    /// Turn the siren (and the hazard alarm pattern) on or off.
    /// Returns `true` if the alarm state changed.
    pub fn set_alarm(&mut self, on: bool, now: Instant, hw: &mut impl ActuatorPort) -> bool {
        if !self.alarm.set(on, now, hw) {
            return false;
        }
        if on {
            self.hazard.start(HazardMode::AlarmContinuous, now, hw);
        } else if self.hazard.mode() == HazardMode::AlarmContinuous {
            self.hazard.cancel(hw);
        }
        true
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_pulse_in_flight(&self) -> bool {
        self.pulse.is_some()
    }

    pub fn is_alarm_on(&self) -> bool {
        self.alarm.is_on()
    }

    pub fn hazard_mode(&self) -> HazardMode {
        self.hazard.mode()
    }

    pub fn is_indicator_blinking(&self) -> bool {
        self.indicator.is_running()
    }

    fn begin_pulse(
        &mut self,
        direction: Direction,
        now: Instant,
        hw: &mut impl ActuatorPort,
    ) -> Result<(), Rejection> {
        if self.pulse.is_some() {
            return Err(Rejection::PulseInFlight);
        }
        let opposite = match direction {
            Direction::Lock => Direction::Unlock,
            Direction::Unlock => Direction::Lock,
        };
        hw.set_output(opposite.pin(), false);
        hw.set_output(direction.pin(), true);
        self.pulse = Some(Pulse {
            direction,
            deadline: now + SOLENOID_PULSE_MS,
        });
        info!("door: {:?} pulse started", direction);
        Ok(())
    }

    fn complete(&mut self, direction: Direction, now: Instant, hw: &mut impl ActuatorPort) -> DoorEvent {
        hw.set_output(direction.pin(), false);
        let (locked, pattern, event) = match direction {
            Direction::Lock => (true, HazardMode::LockPattern, DoorEvent::Locked),
            Direction::Unlock => (false, HazardMode::UnlockPattern, DoorEvent::Unlocked),
        };
        self.locked = locked;
        self.hazard.start(pattern, now, hw);
        self.refresh_indicator(now, hw);
        info!("door: {:?}", event);
        event
    }

    fn refresh_indicator(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        if self.locked && !self.engine_on {
            self.indicator.set_cadence(Cadence::ARMED, now, hw);
        } else {
            self.indicator.stop(hw);
        }
    }
}

impl Default for DoorActuator {
    fn default() -> Self {
        Self::new()
    }
}
