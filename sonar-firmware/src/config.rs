//! Build-time configuration
//!
//! `build.rs` validates sonar.toml and emits its values as constants, so
//! an unsupported prescaler or a zero timeout fails the build instead of
//! producing wrong timing on the board.

use sonar_core::config::{RangerConfig, TimerConfig};
use sonar_core::time::Micros;
use sonar_core::units::SpeedOfSound;

include!(concat!(env!("OUT_DIR"), "/sonar_config.rs"));
