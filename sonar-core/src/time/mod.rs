//! Timekeeping on top of a free-running hardware counter
//!
//! - [`OverflowCounter`] - wrap count shared with the overflow interrupt
//! - [`Timer`] - tick-to-time conversion, consistent reads, busy-wait delay
//! - [`Micros`] - the single time unit used by everything above the timer

pub mod overflow;
pub mod timer;

pub use overflow::OverflowCounter;
pub use timer::Timer;

use core::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A span of time in microseconds
///
/// All time values produced by the timer and consumed by the ranging
/// driver are expressed in this unit, so distance conversion can never
/// mix a tick count with a time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Micros(pub u64);

impl Micros {
    /// Zero duration
    pub const ZERO: Micros = Micros(0);

    /// Create from microseconds
    pub const fn from_micros(us: u64) -> Self {
        Micros(us)
    }

    /// Create from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Micros(ms * 1_000)
    }

    /// Create from whole seconds
    pub const fn from_secs(s: u64) -> Self {
        Micros(s * 1_000_000)
    }

    /// Value in microseconds
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Value in whole milliseconds (truncated)
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Value in seconds as a float
    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / 1_000_000.0
    }

    /// Subtract, clamping at zero
    pub const fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Micros {
    type Output = Micros;

    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Micros {
    type Output = Micros;

    /// Saturating: a reading taken before a timer restart never yields a
    /// huge wrapped span.
    fn sub(self, rhs: Micros) -> Micros {
        self.saturating_sub(rhs)
    }
}
