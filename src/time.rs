//! Monotonic millisecond timestamps with wraparound-tolerant deadlines.
//!
//! The tick source is a free-running `u32` millisecond counter that wraps
//! roughly every 49.7 days.  Absolute comparisons (`now >= deadline`) break
//! across the wrap, so every deadline check in the firmware goes through
//! [`Instant::has_reached`], which looks at the signed difference
//! `now - deadline`:
//!
//! ```text
//!   (now.wrapping_sub(deadline) as i32) >= 0   →  deadline reached
//! ```
//!
//! The rule is valid as long as no deadline lies more than `i32::MAX` ms
//! (~24.8 days) in the future.  The longest interval scheduled anywhere is
//! the 60-minute warm-up run.

use core::fmt;
use core::ops::Add;

/// Milliseconds since boot, modulo 2^32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Instant(u32);

impl Instant {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// `self + ms`, wrapping at `u32::MAX`.
    #[must_use]
    pub const fn add_millis(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Whether `deadline` is now or in the past.
    pub const fn has_reached(self, deadline: Instant) -> bool {
        (self.0.wrapping_sub(deadline.0) as i32) >= 0
    }

    /// Milliseconds left until `deadline`, or 0 once it has been reached.
    pub const fn millis_until(self, deadline: Instant) -> u32 {
        if self.has_reached(deadline) {
            0
        } else {
            deadline.0.wrapping_sub(self.0)
        }
    }

    /// Milliseconds elapsed since `earlier`.
    pub const fn millis_since(self, earlier: Instant) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

impl Add<u32> for Instant {
    type Output = Instant;

    fn add(self, ms: u32) -> Instant {
        self.add_millis(ms)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}
