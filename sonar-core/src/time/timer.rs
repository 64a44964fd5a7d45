//! Interrupt-extended hardware timer
//!
//! A 16-bit counter at a useful clock rate wraps every few milliseconds,
//! far shorter than an echo timeout. The timer pairs the counter with an
//! [`OverflowCounter`] maintained by the overflow interrupt, giving
//!
//! ```text
//! elapsed_ticks = overflows * (MAX_COUNT + 1) + counter
//! elapsed_time  = elapsed_ticks * prescaler / clock_hz
//! ```
//!
//! # Consistent reads
//!
//! The interrupt can fire between reading the overflow count and reading
//! the counter. [`Timer::elapsed_ticks`] loads the overflow count, samples
//! the counter, loads the overflow count again and retries until both
//! loads agree. A wrap whose interrupt has not been serviced yet (pending
//! flag set) is accounted for when the sample sits in the lower half of
//! the counter range, i.e. was taken after the wrap.

use sonar_hal::{HardwareCounter, Prescaler};

use super::{Micros, OverflowCounter};
use crate::config::{ConfigError, TimerConfig};
use crate::traits::Clock;

const MICROS_PER_SEC: u128 = 1_000_000;

/// Free-running timer with overflow extension
pub struct Timer<'a, C> {
    counter: C,
    overflows: &'a OverflowCounter,
    clock_hz: u32,
    prescaler: Prescaler,
}

impl<'a, C: HardwareCounter> Timer<'a, C> {
    /// Create and configure a timer
    ///
    /// # Arguments
    /// - `counter`: The hardware counter to drive
    /// - `overflows`: Wrap count maintained by the overflow interrupt
    /// - `config`: Clock frequency and prescaler
    pub fn new(
        counter: C,
        overflows: &'a OverflowCounter,
        config: &TimerConfig,
    ) -> Result<Self, ConfigError> {
        let prescaler = config.validate()?;
        let mut timer = Self {
            counter,
            overflows,
            clock_hz: config.clock_hz,
            prescaler,
        };
        timer.configure(config)?;
        Ok(timer)
    }

    /// Apply a clock/prescaler configuration
    ///
    /// Programs the prescaler, zeroes the counter and the overflow count,
    /// and unmasks the overflow interrupt. On error the previous
    /// configuration stays in effect.
    pub fn configure(&mut self, config: &TimerConfig) -> Result<(), ConfigError> {
        let prescaler = config.validate()?;
        self.counter.set_prescaler(prescaler)?;

        self.clock_hz = config.clock_hz;
        self.prescaler = prescaler;

        self.restart();
        self.counter.enable_overflow_interrupt();
        Ok(())
    }

    /// Zero the counter and the overflow count
    pub fn restart(&mut self) {
        self.counter.restart();
        self.overflows.reset();
    }

    /// Ticks elapsed since the last restart
    pub fn elapsed_ticks(&self) -> u64 {
        loop {
            let before = self.overflows.load();
            let count = self.counter.read();
            let pending = self.counter.overflow_pending();
            let after = self.overflows.load();

            if before != after {
                // Overflow interrupt ran between the loads
                continue;
            }

            let mut wraps = u64::from(before);
            if pending && u64::from(count) < C::PERIOD / 2 {
                wraps += 1;
            }

            return wraps * C::PERIOD + u64::from(count);
        }
    }

    /// Convert a tick count to microseconds (truncating)
    pub fn ticks_to_micros(&self, ticks: u64) -> Micros {
        let us = u128::from(ticks) * u128::from(self.prescaler.divisor()) * MICROS_PER_SEC
            / u128::from(self.clock_hz);
        Micros(us as u64)
    }

    /// Smallest tick count whose duration is at least `duration`
    pub fn micros_to_ticks_ceil(&self, duration: Micros) -> u64 {
        let per_tick = u128::from(self.prescaler.divisor()) * MICROS_PER_SEC;
        let scaled = u128::from(duration.0) * u128::from(self.clock_hz);
        ((scaled + per_tick - 1) / per_tick) as u64
    }

    /// Time elapsed since the last restart
    pub fn current_time(&self) -> Micros {
        self.ticks_to_micros(self.elapsed_ticks())
    }

    /// Busy-wait for `duration`
    ///
    /// Restarts the timer first, so the wait is relative to the call.
    /// Returns once at least `duration` has elapsed; the calling context
    /// makes no other progress meanwhile.
    pub fn delay(&mut self, duration: Micros) {
        self.restart();
        let target = self.micros_to_ticks_ceil(duration);

        while self.elapsed_ticks() < target {
            core::hint::spin_loop();
        }
    }

    /// Duration of one full counter wrap
    pub fn wrap_period(&self) -> Micros {
        self.ticks_to_micros(C::PERIOD)
    }

    /// Duration of a single tick in nanoseconds (truncated)
    pub fn tick_period_ns(&self) -> u32 {
        (u64::from(self.prescaler.divisor()) * 1_000_000_000 / u64::from(self.clock_hz)) as u32
    }

    /// Configured clock frequency in Hz
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Configured prescaler
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Get access to the underlying counter
    pub fn counter(&self) -> &C {
        &self.counter
    }
}

impl<C: HardwareCounter> Clock for Timer<'_, C> {
    fn now(&self) -> Micros {
        self.current_time()
    }

    fn delay(&mut self, duration: Micros) {
        Timer::delay(self, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use proptest::prelude::*;
    use sonar_hal::CounterError;

    const MAX: u32 = 0xFFFF;
    const PERIOD: u64 = MAX as u64 + 1;

    fn config(clock_hz: u32, prescaler: u32) -> TimerConfig {
        TimerConfig {
            clock_hz,
            prescaler,
        }
    }

    /// Counter frozen at a value set by the test
    struct FixedCounter {
        value: Cell<u32>,
        prescaler: Option<Prescaler>,
        irq_enabled: bool,
    }

    impl FixedCounter {
        fn new() -> Self {
            Self {
                value: Cell::new(0),
                prescaler: None,
                irq_enabled: false,
            }
        }
    }

    impl HardwareCounter for FixedCounter {
        const MAX_COUNT: u32 = MAX;

        fn read(&self) -> u32 {
            self.value.get()
        }

        fn restart(&mut self) {
            self.value.set(0);
        }

        fn set_prescaler(&mut self, prescaler: Prescaler) -> Result<(), CounterError> {
            self.prescaler = Some(prescaler);
            Ok(())
        }

        fn enable_overflow_interrupt(&mut self) {
            self.irq_enabled = true;
        }
    }

    /// Counter that advances after every read, servicing its own overflow
    /// interrupt immediately on wrap
    struct SteppingCounter<'a> {
        value: Cell<u32>,
        last_sample: Cell<u32>,
        step: u32,
        overflows: &'a OverflowCounter,
    }

    impl<'a> SteppingCounter<'a> {
        fn new(step: u32, overflows: &'a OverflowCounter) -> Self {
            Self {
                value: Cell::new(0),
                last_sample: Cell::new(0),
                step,
                overflows,
            }
        }

        /// Ticks at the last sample handed to the timer
        fn sampled_ticks(&self) -> u64 {
            u64::from(self.overflows.load()) * PERIOD + u64::from(self.last_sample.get())
        }
    }

    impl HardwareCounter for SteppingCounter<'_> {
        const MAX_COUNT: u32 = MAX;

        fn read(&self) -> u32 {
            let sample = self.value.get();
            self.last_sample.set(sample);

            let next = u64::from(sample) + u64::from(self.step);
            if next > u64::from(MAX) {
                self.value.set((next - PERIOD) as u32);
                self.overflows.increment();
            } else {
                self.value.set(next as u32);
            }
            sample
        }

        fn restart(&mut self) {
            self.value.set(0);
            self.last_sample.set(0);
        }

        fn set_prescaler(&mut self, _prescaler: Prescaler) -> Result<(), CounterError> {
            Ok(())
        }

        fn enable_overflow_interrupt(&mut self) {}
    }

    /// Where the wrap lands relative to the counter sample
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum WrapPoint {
        /// Wrap and interrupt both happen before the sample
        BeforeSample,
        /// Wrap and interrupt both happen right after the sample
        AfterSample,
        /// Wrap before the sample, interrupt still pending
        PendingBeforeSample,
        /// Wrap right after the sample, interrupt still pending
        PendingAfterSample,
    }

    /// Counter parked at MAX that wraps during a chosen read
    struct RacyCounter<'a> {
        value: Cell<u32>,
        pending: Cell<bool>,
        wrap_at: Cell<Option<WrapPoint>>,
        overflows: &'a OverflowCounter,
    }

    impl<'a> RacyCounter<'a> {
        fn new(overflows: &'a OverflowCounter) -> Self {
            Self {
                value: Cell::new(0),
                pending: Cell::new(false),
                wrap_at: Cell::new(None),
                overflows,
            }
        }

        fn wrap(&self, service: bool) {
            self.value.set(0);
            if service {
                self.overflows.increment();
            } else {
                self.pending.set(true);
            }
        }

        /// Run the deferred interrupt handler
        fn service_pending(&self) {
            if self.pending.replace(false) {
                self.overflows.increment();
            }
        }
    }

    impl HardwareCounter for RacyCounter<'_> {
        const MAX_COUNT: u32 = MAX;

        fn read(&self) -> u32 {
            match self.wrap_at.take() {
                Some(WrapPoint::BeforeSample) => {
                    self.wrap(true);
                    self.value.get()
                }
                Some(WrapPoint::PendingBeforeSample) => {
                    self.wrap(false);
                    self.value.get()
                }
                Some(WrapPoint::AfterSample) => {
                    let sample = self.value.get();
                    self.wrap(true);
                    sample
                }
                Some(WrapPoint::PendingAfterSample) => {
                    let sample = self.value.get();
                    self.wrap(false);
                    sample
                }
                None => self.value.get(),
            }
        }

        fn restart(&mut self) {
            self.value.set(0);
            self.pending.set(false);
        }

        fn set_prescaler(&mut self, _prescaler: Prescaler) -> Result<(), CounterError> {
            Ok(())
        }

        fn enable_overflow_interrupt(&mut self) {}

        fn overflow_pending(&self) -> bool {
            self.pending.get()
        }
    }

    /// Counter that cannot divide by 1024
    struct LimitedCounter;

    impl HardwareCounter for LimitedCounter {
        const MAX_COUNT: u32 = MAX;

        fn read(&self) -> u32 {
            0
        }

        fn restart(&mut self) {}

        fn set_prescaler(&mut self, prescaler: Prescaler) -> Result<(), CounterError> {
            match prescaler {
                Prescaler::Div1024 => Err(CounterError::UnsupportedPrescaler(prescaler)),
                _ => Ok(()),
            }
        }

        fn enable_overflow_interrupt(&mut self) {}
    }

    #[test]
    fn test_new_configures_hardware() {
        let overflows = OverflowCounter::new();
        overflows.increment();

        let counter = FixedCounter::new();
        counter.value.set(1234);

        let timer = Timer::new(counter, &overflows, &config(16_000_000, 64)).unwrap();
        assert_eq!(timer.counter().prescaler, Some(Prescaler::Div64));
        assert!(timer.counter().irq_enabled);
        assert_eq!(timer.elapsed_ticks(), 0);
        assert_eq!(overflows.load(), 0);
    }

    #[test]
    fn test_invalid_prescaler_rejected() {
        let overflows = OverflowCounter::new();
        let result = Timer::new(FixedCounter::new(), &overflows, &config(16_000_000, 100));
        assert!(matches!(result, Err(ConfigError::InvalidPrescaler(100))));
    }

    #[test]
    fn test_zero_clock_rejected() {
        let overflows = OverflowCounter::new();
        let result = Timer::new(FixedCounter::new(), &overflows, &config(0, 8));
        assert!(matches!(result, Err(ConfigError::ZeroClockFrequency)));
    }

    #[test]
    fn test_unsupported_prescaler_keeps_previous_config() {
        let overflows = OverflowCounter::new();
        let mut timer = Timer::new(LimitedCounter, &overflows, &config(125_000_000, 256)).unwrap();

        let result = timer.configure(&config(125_000_000, 1024));
        assert_eq!(
            result,
            Err(ConfigError::CounterRejected(Prescaler::Div1024))
        );
        assert_eq!(timer.prescaler(), Prescaler::Div256);
    }

    #[test]
    fn test_tick_conversion_16mhz() {
        let overflows = OverflowCounter::new();
        let timer = Timer::new(FixedCounter::new(), &overflows, &config(16_000_000, 64)).unwrap();

        // 64 / 16 MHz = 4 µs per tick
        assert_eq!(timer.tick_period_ns(), 4_000);
        assert_eq!(timer.ticks_to_micros(1), Micros(4));
        assert_eq!(timer.ticks_to_micros(2_900), Micros(11_600));
        assert_eq!(timer.wrap_period(), Micros(262_144));
        assert_eq!(timer.micros_to_ticks_ceil(Micros(10)), 3);
        assert_eq!(timer.micros_to_ticks_ceil(Micros(12)), 3);
    }

    #[test]
    fn test_time_right_after_wrap() {
        let overflows = OverflowCounter::new();
        let timer = Timer::new(FixedCounter::new(), &overflows, &config(16_000_000, 8)).unwrap();

        timer.counter().value.set(MAX);
        let before_wrap = timer.current_time();

        timer.counter().value.set(0);
        overflows.increment();
        let after_wrap = timer.current_time();

        // 65536 ticks * 0.5 µs
        assert_eq!(after_wrap, Micros(32_768));
        assert!(after_wrap >= before_wrap);
        assert!(after_wrap.0 - before_wrap.0 <= 1);
    }

    #[test]
    fn test_delay_ends_exactly_on_wrap() {
        let overflows = OverflowCounter::new();
        // 1 MHz, no prescaling: 1 tick = 1 µs, one wrap = 65536 µs
        let mut timer = Timer::new(
            SteppingCounter::new(4096, &overflows),
            &overflows,
            &config(1_000_000, 1),
        )
        .unwrap();

        timer.delay(Micros(65_536));

        // The last accepted sample is the wrap itself: counter 0, one overflow
        assert_eq!(overflows.load(), 1);
        assert_eq!(timer.counter().last_sample.get(), 0);
        assert_eq!(timer.counter().sampled_ticks(), PERIOD);
    }

    #[test]
    fn test_delay_is_relative_to_call() {
        let overflows = OverflowCounter::new();
        let mut timer = Timer::new(
            SteppingCounter::new(100, &overflows),
            &overflows,
            &config(1_000_000, 1),
        )
        .unwrap();

        timer.delay(Micros(200_000));
        assert_eq!(overflows.load(), 3);
        assert_eq!(timer.counter().sampled_ticks(), 200_000);

        timer.delay(Micros(10));
        assert_eq!(overflows.load(), 0);
        assert!(timer.current_time() < Micros(1_000));
    }

    #[test]
    fn test_consistent_read_at_every_wrap_point() {
        let points = [
            WrapPoint::BeforeSample,
            WrapPoint::AfterSample,
            WrapPoint::PendingBeforeSample,
            WrapPoint::PendingAfterSample,
        ];

        for point in points {
            let overflows = OverflowCounter::new();
            let timer =
                Timer::new(RacyCounter::new(&overflows), &overflows, &config(16_000_000, 1))
                    .unwrap();
            for _ in 0..7 {
                overflows.increment();
            }
            timer.counter().value.set(MAX);

            let before = timer.elapsed_ticks();
            timer.counter().wrap_at.set(Some(point));
            let during = timer.elapsed_ticks();
            timer.counter().service_pending();
            let after = timer.elapsed_ticks();

            assert_eq!(before, 7 * PERIOD + u64::from(MAX), "{:?}", point);
            assert_eq!(after, 8 * PERIOD, "{:?}", point);
            assert!(during >= before && during <= after, "{:?}", point);
        }
    }

    proptest! {
        #[test]
        fn prop_time_matches_formula(
            k in 0u32..64,
            r in 0u32..=MAX,
            p_idx in 0usize..5,
            clock_hz in 1_000_000u32..200_000_000,
        ) {
            let prescaler = Prescaler::ALL[p_idx];
            let overflows = OverflowCounter::new();
            let timer = Timer::new(
                FixedCounter::new(),
                &overflows,
                &config(clock_hz, prescaler.divisor()),
            )
            .unwrap();

            for _ in 0..k {
                overflows.increment();
            }
            timer.counter().value.set(r);

            let ticks = u128::from(k) * u128::from(PERIOD) + u128::from(r);
            let expected =
                ticks * u128::from(prescaler.divisor()) * 1_000_000 / u128::from(clock_hz);

            prop_assert_eq!(u128::from(timer.elapsed_ticks()), ticks);
            prop_assert_eq!(u128::from(timer.current_time().0), expected);
        }

        #[test]
        fn prop_delay_never_early(
            duration_us in 0u64..100_000,
            step in 500u32..5_000,
            p_idx in 0usize..3,
        ) {
            let prescaler = Prescaler::ALL[p_idx];
            let overflows = OverflowCounter::new();
            let mut timer = Timer::new(
                SteppingCounter::new(step, &overflows),
                &overflows,
                &config(16_000_000, prescaler.divisor()),
            )
            .unwrap();

            timer.delay(Micros(duration_us));

            let target = timer.micros_to_ticks_ceil(Micros(duration_us));
            let elapsed = timer.counter().sampled_ticks();
            prop_assert!(timer.ticks_to_micros(elapsed) >= Micros(duration_us));
            // Not late by more than one polling step
            prop_assert!(elapsed < target + u64::from(step));
        }

        #[test]
        fn prop_reads_monotonic_across_racy_wrap(k in 0u32..1_000, point in 0usize..4) {
            let point = [
                WrapPoint::BeforeSample,
                WrapPoint::AfterSample,
                WrapPoint::PendingBeforeSample,
                WrapPoint::PendingAfterSample,
            ][point];
            let overflows = OverflowCounter::new();
            let timer =
                Timer::new(RacyCounter::new(&overflows), &overflows, &config(16_000_000, 1))
                    .unwrap();
            for _ in 0..k {
                overflows.increment();
            }
            timer.counter().value.set(MAX);

            let before = timer.elapsed_ticks();
            timer.counter().wrap_at.set(Some(point));
            let during = timer.elapsed_ticks();
            timer.counter().service_pending();
            let after = timer.elapsed_ticks();

            prop_assert!(during >= before);
            prop_assert!(after >= during);
            prop_assert!(during - before <= 1);
            prop_assert!(after - during <= 1);
        }
    }
}
