//! Free-running hardware counter abstraction
//!
//! A counter ticks once every `prescaler` source clock cycles, counts up from
//! zero to [`HardwareCounter::MAX_COUNT`] and wraps back to zero. Each wrap
//! raises an overflow interrupt; servicing that interrupt is the job of the
//! application (see `sonar_core::time::OverflowCounter`).

/// Clock prescaler applied before the counter
///
/// The set is closed: any divisor not listed here is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    /// One tick per clock cycle
    Div1,
    /// One tick every 8 clock cycles
    Div8,
    /// One tick every 64 clock cycles
    Div64,
    /// One tick every 256 clock cycles
    Div256,
    /// One tick every 1024 clock cycles
    Div1024,
}

impl Prescaler {
    /// All prescaler variants, smallest divisor first
    pub const ALL: [Prescaler; 5] = [
        Prescaler::Div1,
        Prescaler::Div8,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    /// Number of source clock cycles per counter tick
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// Clock-select field for the counter control register
    ///
    /// Three-bit encoding used by AVR-style 16-bit timers (`CSn2:CSn0`).
    /// `0b000` means "counter stopped" and is never produced here.
    pub const fn clock_select_bits(self) -> u8 {
        match self {
            Prescaler::Div1 => 0b001,
            Prescaler::Div8 => 0b010,
            Prescaler::Div64 => 0b011,
            Prescaler::Div256 => 0b100,
            Prescaler::Div1024 => 0b101,
        }
    }

    /// Check if this divisor does not exceed `limit`'s
    ///
    /// Backends whose divider tops out below 1024 use this to reject the
    /// variants they cannot realize.
    pub const fn is_at_most(self, limit: Prescaler) -> bool {
        self.divisor() <= limit.divisor()
    }

    /// Look up the variant for a raw divisor
    ///
    /// Returns `None` for anything outside the supported set.
    pub const fn from_divisor(divisor: u32) -> Option<Self> {
        match divisor {
            1 => Some(Prescaler::Div1),
            8 => Some(Prescaler::Div8),
            64 => Some(Prescaler::Div64),
            256 => Some(Prescaler::Div256),
            1024 => Some(Prescaler::Div1024),
            _ => None,
        }
    }
}

/// Errors reported by a counter backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterError {
    /// The peripheral cannot realize this prescaler
    UnsupportedPrescaler(Prescaler),
}

/// Free-running counter with an overflow interrupt source
///
/// Implementations own the peripheral registers. The overflow interrupt
/// handler itself is not part of this trait: it lives in the application
/// and only increments the shared overflow count.
pub trait HardwareCounter {
    /// Largest value the counter reaches before wrapping to zero
    const MAX_COUNT: u32;

    /// Number of ticks in one full wrap period (`MAX_COUNT + 1`)
    const PERIOD: u64 = Self::MAX_COUNT as u64 + 1;

    /// Read the current counter value
    fn read(&self) -> u32;

    /// Zero the counter and clear any pending overflow flag
    fn restart(&mut self);

    /// Program the prescaler and start counting
    fn set_prescaler(&mut self, prescaler: Prescaler) -> Result<(), CounterError>;

    /// Unmask the overflow interrupt
    fn enable_overflow_interrupt(&mut self);

    /// Check if a wrap has happened that the interrupt has not serviced yet
    ///
    /// Backends that cannot observe the raw flag keep the default.
    fn overflow_pending(&self) -> bool {
        false
    }
}
