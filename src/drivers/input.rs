//! Debounced input line with rising/falling edge detection.
//!
//! ## Hardware
//!
//! The start button is an active-low momentary switch with the internal
//! pull-up enabled; the four 433 MHz receiver channels are active-high
//! push-pull outputs that are already clean.  The hardware adapter hides
//! polarity, so this driver only ever sees "asserted" / "not asserted".
//!
//! ## Debounce
//!
//! A level change must stay stable for `debounce_ms` before it is accepted.
//! With `debounce_ms == 0` every change is accepted on the sample that
//! observed it.  At most one edge is reported per sample.

use crate::time::Instant;

/// Contact-bounce filter for the start button.
pub const BUTTON_DEBOUNCE_MS: u32 = 50;
/// Receiver channels are already conditioned by the RF module.
pub const REMOTE_DEBOUNCE_MS: u32 = 0;

/// Edge reported after debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Line became asserted (button pressed, remote channel keyed).
    Rising,
    /// Line released.
    Falling,
}

pub struct InputChannel {
    debounce_ms: u32,
    stable: bool,
    candidate: bool,
    candidate_since: Instant,
}

impl InputChannel {
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            stable: false,
            candidate: false,
            candidate_since: Instant::ZERO,
        }
    }

    pub const fn button() -> Self {
        Self::new(BUTTON_DEBOUNCE_MS)
    }

    pub const fn remote() -> Self {
        Self::new(REMOTE_DEBOUNCE_MS)
    }

    /// Feed one raw sample.  Returns an edge once the new level is stable.
    pub fn sample(&mut self, asserted: bool, now: Instant) -> Option<Edge> {
        if asserted != self.candidate {
            self.candidate = asserted;
            self.candidate_since = now;
        }
        if self.candidate == self.stable {
            return None;
        }
        if now.millis_since(self.candidate_since) < self.debounce_ms {
            return None;
        }
        self.stable = self.candidate;
        Some(if self.stable { Edge::Rising } else { Edge::Falling })
    }

    /// Debounced level.
    pub fn is_asserted(&self) -> bool {
        self.stable
    }
}
