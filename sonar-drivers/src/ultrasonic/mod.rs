//! Ultrasonic ranging sensors
//!
//! - HC-SR04: trigger/echo pulse-width module, 2 cm to ~4 m

pub mod hcsr04;

pub use hcsr04::{Hcsr04, Phase, TRIGGER_PULSE};
