//! Warm-up scheduler: a daily clock-triggered (or forced) timed engine run.
//!
//! ```text
//!   trigger (HH:MM, plausible clock, not yet today)  or  force_start()
//!        │
//!        ▼
//!   IG on ── +1000 ms ──▶ starter pulse 1000 ms (if the latch is free)
//!        │
//!        └── +duration ──▶ ACC / IG / STARTER / LAMP off, WarmEvent::Finished
//! ```
//!
//! The clock-triggered path only runs on a [`ClockReading`] that passes
//! the plausibility gate, and at most once per calendar date.  Forced
//! starts ignore the clock entirely.
//!
//! The starter goes through the shared [`StarterLatch`]: if another flow
//! is cranking when the pending deadline fires, the warm-up crank is
//! dropped rather than queued, and the running pulse is left untouched.

use chrono::NaiveDate;
use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{ActuatorPort, Output};
use crate::clock::ClockReading;
use crate::engine::starter::{StarterLatch, StarterOwner, STARTER_PULSE_MS};
use crate::error::{CommandError, Rejection};
use crate::time::Instant;

pub const DEFAULT_DURATION_MINUTES: u8 = 10;
pub const MIN_DURATION_MINUTES: u8 = 1;
pub const MAX_DURATION_MINUTES: u8 = 60;

pub const DEFAULT_TRIGGER_HOUR: u8 = 15;
pub const DEFAULT_TRIGGER_MINUTE: u8 = 31;

/// Delay between IG on and the warm-up crank.
const STARTER_DELAY_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmEvent {
    /// Clock-triggered cycle began (forced starts report through the
    /// command path instead).
    Started,
    /// Crank engaged; the engine should be flagged on.
    StarterEngaged,
    /// Cycle ended; outputs are already de-asserted.
    Finished,
}

pub type WarmEvents = Vec<WarmEvent, 3>;

pub struct WarmScheduler {
    active: bool,
    end_deadline: Instant,
    starter_pending: bool,
    starter_deadline: Instant,
    last_trigger_date: Option<NaiveDate>,
    duration_minutes: u8,
    trigger_hour: u8,
    trigger_minute: u8,
}

impl WarmScheduler {
    pub fn new(duration_minutes: u8, trigger_hour: u8, trigger_minute: u8) -> Self {
        Self {
            active: false,
            end_deadline: Instant::ZERO,
            starter_pending: false,
            starter_deadline: Instant::ZERO,
            last_trigger_date: None,
            duration_minutes,
            trigger_hour,
            trigger_minute,
        }
    }

    /// Run pending deadlines, then check the daily trigger.
    pub fn tick(
        &mut self,
        now: Instant,
        reading: &ClockReading,
        latch: &mut StarterLatch,
        hw: &mut impl ActuatorPort,
    ) -> WarmEvents {
        let mut events = WarmEvents::new();

        if self.starter_pending && now.has_reached(self.starter_deadline) {
            self.starter_pending = false;
            match latch.try_engage(StarterOwner::Warmup, now, Some(STARTER_PULSE_MS), hw) {
                Ok(()) => {
                    info!("warm: crank pulse");
                    // Capacity 3 and at most one push per branch.
                    let _ = events.push(WarmEvent::StarterEngaged);
                }
                Err(reason) => warn!("warm: crank dropped ({})", reason),
            }
        }

        if self.active && now.has_reached(self.end_deadline) {
            self.finish(latch, hw);
            let _ = events.push(WarmEvent::Finished);
        }

        if self.is_trigger_time(reading) {
            let today = reading.date();
            self.last_trigger_date = Some(today);
            if self.active {
                info!("warm: daily trigger on {} skipped, cycle already running", today);
            } else {
                info!("warm: daily trigger on {}", today);
                self.begin(now, hw);
                let _ = events.push(WarmEvent::Started);
            }
        }

        events
    }

    /// Begin a cycle regardless of the clock.
    pub fn force_start(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Result<(), Rejection> {
        if self.active {
            return Err(Rejection::WarmActive);
        }
        info!("warm: forced start");
        self.begin(now, hw);
        Ok(())
    }

    /// Drop the cycle without touching outputs.  Reset de-asserts them.
    pub fn cancel(&mut self) {
        if self.active {
            info!("warm: cancelled");
        }
        self.active = false;
        self.starter_pending = false;
    }

    pub fn set_duration_minutes(&mut self, minutes: u8) -> Result<(), CommandError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
            return Err(CommandError::OutOfRange);
        }
        self.duration_minutes = minutes;
        info!("warm: duration {} min", minutes);
        Ok(())
    }

    /// Move the daily trigger.  Range checks belong to the caller.
    pub fn set_trigger_time(&mut self, hour: u8, minute: u8) {
        self.trigger_hour = hour;
        self.trigger_minute = minute;
        info!("warm: daily trigger at {:02}:{:02}", hour, minute);
    }

    pub fn trigger_time(&self) -> (u8, u8) {
        (self.trigger_hour, self.trigger_minute)
    }

    /// Time left in the running cycle, 0 when inactive.
    pub fn remaining_ms(&self, now: Instant) -> u32 {
        if self.active {
            now.millis_until(self.end_deadline)
        } else {
            0
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_starter_pending(&self) -> bool {
        self.starter_pending
    }

    pub fn duration_minutes(&self) -> u8 {
        self.duration_minutes
    }

    pub fn last_trigger_date(&self) -> Option<NaiveDate> {
        self.last_trigger_date
    }

    fn is_trigger_time(&self, reading: &ClockReading) -> bool {
        reading.is_plausible()
            && reading.hour() == u32::from(self.trigger_hour)
            && reading.minute() == u32::from(self.trigger_minute)
            && self.last_trigger_date != Some(reading.date())
    }

    fn begin(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        hw.set_output(Output::Ignition, true);
        self.active = true;
        self.starter_pending = true;
        self.starter_deadline = now + STARTER_DELAY_MS;
        self.end_deadline = now + u32::from(self.duration_minutes) * 60_000;
        info!("warm: IG on, running {} min", self.duration_minutes);
    }

    fn finish(&mut self, latch: &mut StarterLatch, hw: &mut impl ActuatorPort) {
        self.active = false;
        self.starter_pending = false;
        hw.set_output(Output::Acc, false);
        hw.set_output(Output::Ignition, false);
        hw.set_output(Output::Lamp, false);
        // Another holder's crank is its owner's to end.
        latch.release(StarterOwner::Warmup, hw);
        info!("warm: done");
    }
}
