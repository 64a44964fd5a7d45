//! Distance and closing speed

use core::fmt;

use super::SpeedOfSound;
use crate::time::Micros;

/// Distance to the reflecting object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance {
    um: u32,
}

impl Distance {
    /// Create from micrometres
    pub const fn from_um(um: u32) -> Self {
        Self { um }
    }

    /// Create from millimetres
    pub const fn from_mm(mm: u32) -> Self {
        Self {
            um: mm.saturating_mul(1000),
        }
    }

    /// Convert an echo pulse width into a one-way distance
    ///
    /// The echo covers the round trip, hence the division by two:
    /// `um = width_us * mm_per_s / 2000`.
    pub fn from_echo(width: Micros, speed_of_sound: SpeedOfSound) -> Self {
        let um = u128::from(width.as_micros()) * u128::from(speed_of_sound.mm_per_s()) / 2000;
        Self {
            um: um.min(u128::from(u32::MAX)) as u32,
        }
    }

    /// Value in micrometres
    pub const fn um(self) -> u32 {
        self.um
    }

    /// Value in whole millimetres (truncated)
    pub const fn mm(self) -> u32 {
        self.um / 1000
    }

    /// Value in centimetres
    pub fn cm_f32(self) -> f32 {
        self.um as f32 / 10_000.0
    }

    /// Value in metres
    pub fn m_f32(self) -> f32 {
        self.um as f32 / 1_000_000.0
    }

    /// Value in inches
    pub fn inches_f32(self) -> f32 {
        self.um as f32 / 25_400.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} cm", self.um / 10_000, (self.um / 100) % 100)
    }
}

/// Rate of change of distance
///
/// Negative values mean the object is approaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Speed {
    um_per_s: i32,
}

impl Speed {
    /// Create from micrometres per second
    pub const fn from_um_per_s(um_per_s: i32) -> Self {
        Self { um_per_s }
    }

    /// Two-point finite difference `(second - first) / interval`
    ///
    /// No filtering: noise in either sample goes straight into the result.
    /// A zero interval is treated as 1 µs.
    pub fn between(first: Distance, second: Distance, interval: Micros) -> Self {
        let delta_um = i64::from(second.um()) - i64::from(first.um());
        let interval_us = interval.as_micros().max(1) as i128;
        let um_per_s = i128::from(delta_um) * 1_000_000 / interval_us;
        Self {
            um_per_s: um_per_s.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32,
        }
    }

    /// Value in micrometres per second
    pub const fn um_per_s(self) -> i32 {
        self.um_per_s
    }

    /// Value in whole millimetres per second (truncated toward zero)
    pub const fn mm_per_s(self) -> i32 {
        self.um_per_s / 1000
    }

    /// Value in metres per second
    pub fn m_per_s_f32(self) -> f32 {
        self.um_per_s as f32 / 1_000_000.0
    }

    /// Check if the object is getting closer
    pub fn is_approaching(self) -> bool {
        self.um_per_s < 0
    }
}
