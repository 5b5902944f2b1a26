//! Engine start sequencer.
//!
//! ```text
//!            trigger/press                 +1000 ms            +1000 ms
//!   ┌──────┐ ───────────▶ ┌─────────┐ ──────────▶ ┌────────┐ ──────────▶ ┌───────────────┐
//!   │ Idle │              │ AccWait │             │ IgWait │             │ StarterActive │
//!   └──────┘              └─────────┘             └────────┘             └───────────────┘
//!       ▲                   ACC on                  IG on                  starter engaged
//!       │                                                                        │ +1000 ms
//!       │  countdown deadline (engine assumed running)                           ▼
//!       └──────────────────────────────────────────────────────────────── ┌───────────┐
//!                                       trigger ──▶ StarterActive         │ Countdown │
//!                                       press   ──▶ manual hold           └───────────┘
//! ```
//!
//! The countdown window is armed at trigger time and runs in parallel with
//! the ignition ramp.  When it elapses the sequencer declares the engine
//! running; nothing here senses real combustion.
//!
//! The starter is driven exclusively through [`StarterLatch`].  If another
//! flow holds it when `IgWait` expires, the sequencer stays in `IgWait` and
//! retries on the next tick.
//!
//! Boundary rule: the controller delivers input before calling
//! [`EngineSequencer::tick`], so a trigger arriving on the exact tick a
//! deadline expires is judged against the old state.

pub mod starter;

use log::{debug, info};

use crate::app::ports::{ActuatorPort, Output};
use crate::drivers::blink::{Blinker, Cadence};
use crate::error::Rejection;
use crate::time::Instant;

use starter::{StarterLatch, StarterOwner};

/// Duration of the ACC and IG stages.
pub const STAGE_MS: u32 = 1000;
/// Duration of the timed crank.
pub const CRANK_MS: u32 = 1000;

pub const DEFAULT_COUNTDOWN_WINDOW_MS: u32 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    AccWait,
    IgWait,
    StarterActive,
    Countdown,
}

/// Outcome of a trigger or press, applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Idle → AccWait.
    Started,
    /// Countdown → StarterActive with a fresh crank.
    Restarted,
    /// Countdown: starter held until the button is released.
    HoldEngaged,
    /// Engine already running: the caller should perform a full reset.
    ResetRequested,
    /// Nothing happened.
    Ignored(Rejection),
}

/// Deadline-driven notifications from [`EngineSequencer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Countdown elapsed; the engine is assumed running.
    EngineRunning,
}

pub struct EngineSequencer {
    state: SequencerState,
    state_deadline: Instant,
    countdown_deadline: Instant,
    countdown_window_ms: u32,
    manual_hold_active: bool,
    engine_on: bool,
    power_led: Blinker,
}

impl EngineSequencer {
    pub fn new(countdown_window_ms: u32) -> Self {
        Self {
            state: SequencerState::Idle,
            state_deadline: Instant::ZERO,
            countdown_deadline: Instant::ZERO,
            countdown_window_ms,
            manual_hold_active: false,
            engine_on: false,
            power_led: Blinker::new(Output::PowerLed),
        }
    }

    /// Start the idle blink on the power LED.
    pub fn begin(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        self.power_led.set_cadence(Cadence::SLOW, now, hw);
    }

    /// Remote, wireless or `start_the_car` trigger.
    pub fn trigger(
        &mut self,
        now: Instant,
        latch: &mut StarterLatch,
        hw: &mut impl ActuatorPort,
    ) -> Trigger {
        if self.engine_on {
            return Trigger::ResetRequested;
        }
        match self.state {
            SequencerState::Idle => self.start(now, hw),
            SequencerState::Countdown => {
                if let Err(reason) = latch.try_engage(StarterOwner::Sequencer, now, None, hw) {
                    return Trigger::Ignored(reason);
                }
                self.state = SequencerState::StarterActive;
                self.state_deadline = now + CRANK_MS;
                self.countdown_deadline = now + self.countdown_window_ms;
                self.power_led.set_cadence(Cadence::FAST, now, hw);
                info!("sequencer: re-crank from countdown");
                Trigger::Restarted
            }
            _ => {
                debug!("sequencer: trigger ignored in {:?}", self.state);
                Trigger::Ignored(Rejection::StartPending)
            }
        }
    }

    /// Physical button press edge.
    pub fn press(
        &mut self,
        now: Instant,
        latch: &mut StarterLatch,
        hw: &mut impl ActuatorPort,
    ) -> Trigger {
        if self.engine_on {
            return Trigger::ResetRequested;
        }
        match self.state {
            SequencerState::Idle => self.start(now, hw),
            SequencerState::Countdown => {
                if let Err(reason) = latch.try_engage(StarterOwner::ManualHold, now, None, hw) {
                    return Trigger::Ignored(reason);
                }
                self.manual_hold_active = true;
                self.countdown_deadline = now + self.countdown_window_ms;
                self.power_led.set_cadence(Cadence::FAST, now, hw);
                info!("sequencer: manual starter hold");
                Trigger::HoldEngaged
            }
            _ => Trigger::Ignored(Rejection::StartPending),
        }
    }

    /// Physical button release edge.  Ends a manual hold, if any.
    pub fn release(&mut self, latch: &mut StarterLatch, hw: &mut impl ActuatorPort) -> bool {
        if !self.manual_hold_active {
            return false;
        }
        self.manual_hold_active = false;
        latch.release(StarterOwner::ManualHold, hw);
        info!("sequencer: manual hold released");
        true
    }

    /// Advance at most one stage whose deadline has passed.
    pub fn tick(
        &mut self,
        now: Instant,
        latch: &mut StarterLatch,
        hw: &mut impl ActuatorPort,
    ) -> Option<SequencerEvent> {
        self.power_led.tick(now, hw);

        match self.state {
            SequencerState::Idle => None,
            SequencerState::AccWait => {
                if now.has_reached(self.state_deadline) {
                    hw.set_output(Output::Ignition, true);
                    self.state = SequencerState::IgWait;
                    self.state_deadline = now + STAGE_MS;
                    debug!("sequencer: IG on");
                }
                None
            }
            SequencerState::IgWait => {
                if now.has_reached(self.state_deadline)
                    && latch
                        .try_engage(StarterOwner::Sequencer, now, None, hw)
                        .is_ok()
                {
                    self.state = SequencerState::StarterActive;
                    self.state_deadline = now + CRANK_MS;
                    self.power_led.set_cadence(Cadence::FAST, now, hw);
                    debug!("sequencer: cranking");
                }
                None
            }
            SequencerState::StarterActive => {
                if now.has_reached(self.state_deadline) {
                    latch.release(StarterOwner::Sequencer, hw);
                    self.state = SequencerState::Countdown;
                    debug!("sequencer: countdown until {}", self.countdown_deadline);
                }
                None
            }
            SequencerState::Countdown => {
                if !now.has_reached(self.countdown_deadline) {
                    return None;
                }
                self.release(latch, hw);
                self.state = SequencerState::Idle;
                self.engine_on = true;
                self.power_led.set_cadence(Cadence::SLOW, now, hw);
                info!("sequencer: engine assumed running");
                Some(SequencerEvent::EngineRunning)
            }
        }
    }

    /// Drop back to Idle without touching ignition outputs.
    ///
    /// Used by full reset, which de-asserts the outputs itself.
    pub fn abort(&mut self, now: Instant, latch: &mut StarterLatch, hw: &mut impl ActuatorPort) {
        if self.state != SequencerState::Idle || self.manual_hold_active {
            info!("sequencer: aborted from {:?}", self.state);
        }
        latch.release(StarterOwner::Sequencer, hw);
        latch.release(StarterOwner::ManualHold, hw);
        self.manual_hold_active = false;
        self.state = SequencerState::Idle;
        self.power_led.set_cadence(Cadence::SLOW, now, hw);
    }

    pub fn set_engine_status(&mut self, on: bool) {
        self.engine_on = on;
    }

    pub fn set_countdown_window(&mut self, ms: u32) {
        self.countdown_window_ms = ms;
    }

    pub fn countdown_window_ms(&self) -> u32 {
        self.countdown_window_ms
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn engine_on(&self) -> bool {
        self.engine_on
    }

    /// A start is ramping: a new start request must be refused.
    pub fn is_start_pending(&self) -> bool {
        matches!(
            self.state,
            SequencerState::AccWait | SequencerState::IgWait | SequencerState::StarterActive
        )
    }

    /// Crank stage active or button held during countdown.
    pub fn is_starter_running(&self) -> bool {
        self.state == SequencerState::StarterActive || self.manual_hold_active
    }

    pub fn is_manual_hold_active(&self) -> bool {
        self.manual_hold_active
    }

    pub fn power_led_cadence(&self) -> Option<Cadence> {
        self.power_led.cadence()
    }

    pub fn state_deadline(&self) -> Instant {
        self.state_deadline
    }

    pub fn countdown_deadline(&self) -> Instant {
        self.countdown_deadline
    }

    fn start(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Trigger {
        hw.set_output(Output::Acc, true);
        self.state = SequencerState::AccWait;
        self.state_deadline = now + STAGE_MS;
        self.countdown_deadline = now + self.countdown_window_ms;
        self.power_led.set_cadence(Cadence::SLOW, now, hw);
        info!(
            "sequencer: start, ACC on, countdown {} ms",
            self.countdown_window_ms
        );
        Trigger::Started
    }
}
