//! Distance sensor trait and errors

use crate::units::{Distance, Speed};

/// Value reported in place of a distance when no measurement was obtained
pub const TIMEOUT_SENTINEL_CM: f32 = -1.0;

/// Errors that can occur during a ranging measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingError {
    /// Echo line never went active after the trigger (no response)
    NoEcho,
    /// Echo line stayed active past the timeout (nothing in range)
    EchoTooLong,
    /// Echo line was already active before the trigger
    EchoBusy,
    /// GPIO read or write failed
    Pin,
}

impl RangingError {
    /// Check if this is one of the two timeout outcomes
    ///
    /// Timeouts are a normal result in open air ("no object"), not a fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RangingError::NoEcho | RangingError::EchoTooLong)
    }
}

/// Trait for distance sensors
pub trait DistanceSensor {
    /// Measure the distance to the nearest object
    fn read_distance(&mut self) -> Result<Distance, RangingError>;

    /// Measure the closing speed from two consecutive distances
    fn read_speed(&mut self) -> Result<Speed, RangingError>;
}

/// Collapse a measurement into centimetres, `-1` when none was obtained
pub fn distance_cm_or_sentinel(result: &Result<Distance, RangingError>) -> f32 {
    match result {
        Ok(distance) => distance.cm_f32(),
        Err(_) => TIMEOUT_SENTINEL_CM,
    }
}
