//! Sonar Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the ranging core relies on,
//! so that the same timing and driver code runs against a real peripheral
//! on the target and against in-memory fakes on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (sonar-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sonar-core / sonar-drivers             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sonar-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  sonar-hal-   │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`counter::HardwareCounter`] - Free-running counter with overflow interrupt
//! - [`uart::UartTx`], [`uart::UartRx`] - Byte-stream serial transport
//!
//! Digital I/O uses the `embedded-hal` 1.0 traits directly.

#![no_std]
#![deny(unsafe_code)]

pub mod counter;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use counter::{CounterError, HardwareCounter, Prescaler};
pub use uart::{UartConfig, UartRx, UartTx};
