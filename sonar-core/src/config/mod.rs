//! Configuration types
//!
//! Board-agnostic configuration structures, validated before any
//! hardware is touched.

pub mod types;

pub use types::*;
