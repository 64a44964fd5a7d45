//! RP2040-specific HAL for the ranging firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `sonar-hal` traits:
//!
//! - Free-running 16-bit counter on a PWM slice, with wrap interrupt
//! - Blocking UART adapter for the Bluetooth link

#![no_std]

pub mod counter;
pub mod uart;

pub use counter::{PwmCounter, MAX_PRESCALER};
pub use uart::{RpUart, UartPort};
