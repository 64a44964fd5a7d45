//! Overflow count shared between interrupt and main context
//!
//! The overflow interrupt handler is the only writer in normal operation:
//! it performs a single `increment()`. The main loop only loads the value,
//! except when the timer restarts and zeroes it.
//!
//! ```ignore
//! static OVERFLOWS: OverflowCounter = OverflowCounter::new();
//!
//! #[interrupt]
//! fn PWM_IRQ_WRAP() {
//!     counter.clear_overflow_flag();
//!     OVERFLOWS.increment();
//! }
//! ```

use portable_atomic::{AtomicU32, Ordering};

/// Number of hardware counter wraps since the last restart
#[derive(Debug)]
pub struct OverflowCounter {
    count: AtomicU32,
}

impl Default for OverflowCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl OverflowCounter {
    /// Create a counter at zero (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one wrap
    ///
    /// Called from the overflow interrupt handler.
    #[inline]
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Current wrap count
    #[inline]
    pub fn load(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset to zero
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}
