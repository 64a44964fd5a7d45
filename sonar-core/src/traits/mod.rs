//! Hardware abstraction traits
//!
//! These traits define the interface between the ranging logic and the
//! time source / sensor implementations.

pub mod clock;
pub mod ranging;

pub use clock::Clock;
pub use ranging::{distance_cm_or_sentinel, DistanceSensor, RangingError, TIMEOUT_SENTINEL_CM};
