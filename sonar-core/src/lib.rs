//! Board-agnostic core logic for the ranging firmware
//!
//! This crate contains all logic that does not depend on a specific chip:
//!
//! - Interrupt-extended timer (overflow counting, consistent reads, delays)
//! - Time and physical unit types (microseconds, distance, speed)
//! - Clock and distance sensor traits
//! - Configuration type definitions and validation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod time;
pub mod traits;
pub mod units;
