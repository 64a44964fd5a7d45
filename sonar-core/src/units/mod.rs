//! Physical quantities derived from echo timing
//!
//! Integer fixed-point representations: distances in micrometres, speeds
//! in micrometres per second, the speed of sound in millimetres per second.
//! Float accessors exist for reporting only.

pub mod distance;
pub mod sound;

pub use distance::{Distance, Speed};
pub use sound::SpeedOfSound;
