//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in sonar-core for the attached modules:
//!
//! - Ultrasonic ranging (HC-SR04)
//! - Bluetooth serial link (HC-05)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bluetooth;
pub mod ultrasonic;
