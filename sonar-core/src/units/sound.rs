//! Speed of sound in air

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Speed of sound at 0°C (mm/s)
const SPEED_AT_0C_MM_S: i32 = 331_300;

/// Increase per °C (mm/s)
const SPEED_PER_C_MM_S: i32 = 606;

/// Speed of sound used to convert echo time into distance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpeedOfSound {
    mm_per_s: u32,
}

impl Default for SpeedOfSound {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SpeedOfSound {
    /// 343 m/s, dry air at roughly 20°C
    pub const DEFAULT: SpeedOfSound = SpeedOfSound { mm_per_s: 343_000 };

    /// Create from millimetres per second
    pub const fn from_mm_per_s(mm_per_s: u32) -> Self {
        Self { mm_per_s }
    }

    /// Estimate from air temperature
    ///
    /// Linear model `331.3 + 0.606 * T` m/s, accurate to well under 1%
    /// between -20°C and 50°C.
    ///
    /// # Arguments
    /// - `temp_x10`: Temperature in 0.1°C units (e.g., 200 = 20.0°C)
    pub fn from_celsius_x10(temp_x10: i16) -> Self {
        let mm_per_s = SPEED_AT_0C_MM_S + SPEED_PER_C_MM_S * i32::from(temp_x10) / 10;
        Self {
            mm_per_s: mm_per_s.max(0) as u32,
        }
    }

    /// Value in millimetres per second
    pub const fn mm_per_s(self) -> u32 {
        self.mm_per_s
    }

    /// Value in metres per second
    pub fn m_per_s_f32(self) -> f32 {
        self.mm_per_s as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(SpeedOfSound::default().mm_per_s(), 343_000);
        assert!((SpeedOfSound::DEFAULT.m_per_s_f32() - 343.0).abs() < 1e-3);
    }

    #[test]
    fn test_temperature_model() {
        assert_eq!(SpeedOfSound::from_celsius_x10(0).mm_per_s(), 331_300);
        // 20.0°C
        assert_eq!(SpeedOfSound::from_celsius_x10(200).mm_per_s(), 343_420);
        // -10.0°C
        assert_eq!(SpeedOfSound::from_celsius_x10(-100).mm_per_s(), 325_240);
    }

    #[test]
    fn test_warmer_is_faster() {
        let cold = SpeedOfSound::from_celsius_x10(-200);
        let warm = SpeedOfSound::from_celsius_x10(450);
        assert!(warm.mm_per_s() > cold.mm_per_s());
    }
}
