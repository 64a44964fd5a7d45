//! Configuration type definitions
//!
//! Raw values (as read from a config file) are kept as plain integers and
//! checked by `validate()`, so an unsupported prescaler or a zero timeout
//! is rejected at configuration time instead of producing wrong timing.

use sonar_hal::{CounterError, Prescaler};

use crate::time::Micros;
use crate::units::SpeedOfSound;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default CPU clock for the classic 16 MHz boards
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

/// Default echo timeout (~5 m of round trip at 343 m/s)
pub const DEFAULT_TIMEOUT_US: u64 = 30_000;

/// Default interval between the two samples of a speed measurement
pub const DEFAULT_SPEED_INTERVAL_US: u64 = 1_000_000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Prescaler divisor outside {1, 8, 64, 256, 1024}
    InvalidPrescaler(u32),
    /// Clock frequency of zero
    ZeroClockFrequency,
    /// The counter hardware cannot realize this prescaler
    CounterRejected(Prescaler),
    /// Echo timeout of zero
    ZeroTimeout,
    /// Speed sample interval of zero
    ZeroSpeedInterval,
    /// Speed of sound of zero
    ZeroSpeedOfSound,
}

impl From<CounterError> for ConfigError {
    fn from(e: CounterError) -> Self {
        match e {
            CounterError::UnsupportedPrescaler(p) => ConfigError::CounterRejected(p),
        }
    }
}

/// Timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimerConfig {
    /// Counter source clock in Hz
    pub clock_hz: u32,
    /// Prescaler divisor (1, 8, 64, 256 or 1024)
    pub prescaler: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            prescaler: 8,
        }
    }
}

impl TimerConfig {
    /// Same prescaler, counting a different source clock
    ///
    /// Used when the actual clock is only known at runtime.
    pub const fn with_clock_hz(self, clock_hz: u32) -> Self {
        Self {
            clock_hz,
            prescaler: self.prescaler,
        }
    }

    /// Check the configuration and resolve the prescaler
    pub fn validate(&self) -> Result<Prescaler, ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroClockFrequency);
        }
        Prescaler::from_divisor(self.prescaler).ok_or(ConfigError::InvalidPrescaler(self.prescaler))
    }
}

/// Ranging driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangerConfig {
    /// Upper bound on each echo wait (rise and fall)
    pub timeout: Micros,
    /// Speed of sound used for the distance conversion
    pub speed_of_sound: SpeedOfSound,
    /// Pause between the two samples of a speed measurement
    pub speed_interval: Micros,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            timeout: Micros(DEFAULT_TIMEOUT_US),
            speed_of_sound: SpeedOfSound::DEFAULT,
            speed_interval: Micros(DEFAULT_SPEED_INTERVAL_US),
        }
    }
}

impl RangerConfig {
    /// Check the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == Micros::ZERO {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.speed_interval == Micros::ZERO {
            return Err(ConfigError::ZeroSpeedInterval);
        }
        if self.speed_of_sound.mm_per_s() == 0 {
            return Err(ConfigError::ZeroSpeedOfSound);
        }
        Ok(())
    }

    /// Farthest distance measurable before the echo wait times out
    pub fn max_range(&self) -> crate::units::Distance {
        crate::units::Distance::from_echo(self.timeout, self.speed_of_sound)
    }
}
