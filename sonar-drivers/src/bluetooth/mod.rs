//! Bluetooth serial links

pub mod hc05;

pub use hc05::{Hc05, Hc05Error};
