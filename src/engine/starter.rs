//! Starter relay latch — the single mutual-exclusion point in the firmware.
//!
//! ```text
//!   Sequencer ──┐
//!   ManualHold ─┤  try_engage()   ┌──────────────┐
//!   Warmup ─────┼───────────────▶ │ StarterLatch │ ──▶ Output::Starter
//!   Command ────┘                 └──────────────┘
//! ```
//!
//! Whoever engages the latch owns the starter until it releases it (or the
//! timed pulse expires, or a reset forces it off).  A second engage while
//! busy is refused without touching the pin, so an in-flight pulse is
//! never re-asserted or extended.  Nothing else in the crate writes
//! [`Output::Starter`].

use log::{debug, info};

use crate::app::ports::{ActuatorPort, Output};
use crate::error::Rejection;
use crate::time::Instant;

/// Self-releasing starter pulse used by warm-up and `starter_on`.
pub const STARTER_PULSE_MS: u32 = 1000;

/// Flow currently holding the starter relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterOwner {
    /// Timed crank stage of the start sequence.
    Sequencer,
    /// Button held during the post-start countdown.
    ManualHold,
    /// Scheduled warm-up crank.
    Warmup,
    /// `starter_on` command.
    Command,
}

#[derive(Debug, Default)]
pub struct StarterLatch {
    holder: Option<StarterOwner>,
    release_at: Option<Instant>,
}

impl StarterLatch {
    pub const fn new() -> Self {
        Self {
            holder: None,
            release_at: None,
        }
    }

    /// Engage the starter for `owner`.
    ///
    /// With `pulse_ms` set the latch releases itself once the pulse has
    /// elapsed (see [`tick`](Self::tick)); otherwise the owner must call
    /// [`release`](Self::release).
    pub fn try_engage(
        &mut self,
        owner: StarterOwner,
        now: Instant,
        pulse_ms: Option<u32>,
        hw: &mut impl ActuatorPort,
    ) -> Result<(), Rejection> {
        if let Some(holder) = self.holder {
            debug!("starter: {:?} refused, held by {:?}", owner, holder);
            return Err(Rejection::StarterBusy);
        }
        self.holder = Some(owner);
        self.release_at = pulse_ms.map(|ms| now + ms);
        hw.set_output(Output::Starter, true);
        info!("starter: engaged by {:?}", owner);
        Ok(())
    }

    /// Release the starter if `owner` holds it.  Returns whether it did.
    pub fn release(&mut self, owner: StarterOwner, hw: &mut impl ActuatorPort) -> bool {
        if self.holder != Some(owner) {
            return false;
        }
        self.clear(hw);
        info!("starter: released by {:?}", owner);
        true
    }

    /// Release an expired timed pulse.  Returns the owner it released.
    pub fn tick(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Option<StarterOwner> {
        let deadline = self.release_at?;
        if !now.has_reached(deadline) {
            return None;
        }
        let owner = self.holder;
        self.clear(hw);
        debug!("starter: timed pulse for {:?} ended", owner);
        owner
    }

    /// Unconditional release, used by full reset.
    pub fn force_off(&mut self, hw: &mut impl ActuatorPort) {
        if let Some(owner) = self.holder {
            info!("starter: forced off (was {:?})", owner);
        }
        self.clear(hw);
    }

    pub fn is_busy(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<StarterOwner> {
        self.holder
    }

    fn clear(&mut self, hw: &mut impl ActuatorPort) {
        self.holder = None;
        self.release_at = None;
        hw.set_output(Output::Starter, false);
    }
}
