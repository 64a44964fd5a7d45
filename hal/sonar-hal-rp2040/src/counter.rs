//! Free-running counter on a PWM slice
//!
//! Each RP2040 PWM slice has a 16-bit counter clocked from `clk_sys`
//! through a fractional divider. With `TOP = 0xFFFF` and no outputs the
//! slice is a plain free-running counter, and its wrap sets a bit in the
//! shared `PWM_IRQ_WRAP` interrupt.
//!
//! The divider is 8.4 fixed point, so its largest value is 255.9375.
//! Divide-by-256 and divide-by-1024 cannot be realized; [`MAX_PRESCALER`]
//! is the largest supported variant.
//!
//! # Interrupt handler
//!
//! The firmware owns the handler and counts the wraps:
//!
//! ```ignore
//! #[interrupt]
//! fn PWM_IRQ_WRAP() {
//!     if acknowledge_wrap(SLICE) {
//!         OVERFLOWS.increment();
//!     }
//! }
//! ```

use embassy_rp::interrupt::{self, InterruptExt};
use embassy_rp::pac;
use embassy_rp::pwm::{Config, Pwm, Slice};
use embassy_rp::Peri;
use fixed::FixedU16;

use sonar_hal::{CounterError, HardwareCounter, Prescaler};

/// Largest prescaler the PWM divider can realize
pub const MAX_PRESCALER: Prescaler = Prescaler::Div64;

/// Acknowledge a wrap of `slice` from the interrupt handler
///
/// Returns `true` if the slice had a pending wrap, which is then cleared.
pub fn acknowledge_wrap(slice: u8) -> bool {
    let mask = 1u32 << slice;
    if pac::PWM.ints().read().0 & mask == 0 {
        return false;
    }
    pac::PWM.intr().write_value(pac::pwm::regs::Intr(mask));
    true
}

/// 16-bit counter on one PWM slice
pub struct PwmCounter<'d> {
    pwm: Pwm<'d>,
    slice: u8,
    config: Config,
}

impl<'d> PwmCounter<'d> {
    /// Take a PWM slice and start it counting at `clk_sys / 1`
    pub fn new<T: Slice>(slice: Peri<'d, T>) -> Self {
        let number = slice.number();

        let mut config = Config::default();
        config.top = u16::MAX;
        config.divider = FixedU16::from_num(1);

        let pwm = Pwm::new_free(slice, config.clone());
        Self {
            pwm,
            slice: number,
            config,
        }
    }

    /// PWM slice number, as passed to [`acknowledge_wrap`]
    pub fn slice(&self) -> u8 {
        self.slice
    }

    fn mask(&self) -> u32 {
        1u32 << self.slice
    }

    fn clear_wrap(&self) {
        pac::PWM.intr().write_value(pac::pwm::regs::Intr(self.mask()));
    }
}

impl HardwareCounter for PwmCounter<'_> {
    const MAX_COUNT: u32 = u16::MAX as u32;

    fn read(&self) -> u32 {
        u32::from(self.pwm.counter())
    }

    fn restart(&mut self) {
        self.pwm.set_counter(0);
        // A wrap from before the restart must not be counted
        self.clear_wrap();
    }

    fn set_prescaler(&mut self, prescaler: Prescaler) -> Result<(), CounterError> {
        if !prescaler.is_at_most(MAX_PRESCALER) {
            return Err(CounterError::UnsupportedPrescaler(prescaler));
        }

        self.config.divider = FixedU16::from_num(prescaler.divisor());
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn enable_overflow_interrupt(&mut self) {
        let mask = self.mask();
        self.clear_wrap();
        pac::PWM.inte().modify(|w| w.0 |= mask);

        interrupt::PWM_IRQ_WRAP.unpend();
        // SAFETY: the firmware defines the PWM_IRQ_WRAP handler before the
        // counter is configured
        unsafe {
            interrupt::PWM_IRQ_WRAP.enable();
        }
    }

    fn overflow_pending(&self) -> bool {
        pac::PWM.intr().read().0 & self.mask() != 0
    }
}
