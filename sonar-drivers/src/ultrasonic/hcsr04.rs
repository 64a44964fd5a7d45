//! HC-SR04 ultrasonic ranging driver
//!
//! Each measurement runs one pass of the echo-timing state machine:
//!
//! ```text
//! Idle -> TriggerPulse -> AwaitEchoRise -> AwaitEchoFall -> Done | Timeout
//! ```
//!
//! The trigger line is held high for 10 µs, then the echo line is polled
//! against the [`Clock`]. The echo stays high for the round-trip time of
//! the acoustic burst, so `distance = width * speed_of_sound / 2`.
//!
//! # Timeout policy
//!
//! Both waits are bounded by the same timeout. A missing rising edge gives
//! [`RangingError::NoEcho`], an echo still high at the deadline gives
//! [`RangingError::EchoTooLong`]. Either way the trigger line is left low
//! and the timer keeps running; no retry is attempted.
//!
//! # Usage
//!
//! ```ignore
//! let mut sensor = Hcsr04::new(trigger, echo, timer, RangerConfig::default())?;
//!
//! match sensor.measure_distance(Micros::from_millis(30)) {
//!     Ok(d) => info!("{} mm", d.mm()),
//!     Err(e) if e.is_timeout() => info!("out of range"),
//!     Err(e) => warn!("ranging failed: {}", e),
//! }
//! ```

use embedded_hal::digital::{InputPin, OutputPin};

use sonar_core::config::{ConfigError, RangerConfig};
use sonar_core::time::Micros;
use sonar_core::traits::{Clock, DistanceSensor, RangingError};
use sonar_core::units::{Distance, Speed, SpeedOfSound};

/// Trigger pulse width from the HC-SR04 datasheet
pub const TRIGGER_PULSE: Micros = Micros(10);

/// Measurement phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Trigger low, no measurement in progress
    Idle,
    /// Trigger held high
    TriggerPulse,
    /// Waiting for the echo line to go high
    AwaitEchoRise,
    /// Timing the echo pulse
    AwaitEchoFall,
    /// Last measurement produced a distance
    Done,
    /// Last measurement timed out
    Timeout,
}

/// HC-SR04 driver
pub struct Hcsr04<TRIG, ECHO, CLK> {
    trigger: TRIG,
    echo: ECHO,
    clock: CLK,
    config: RangerConfig,
    phase: Phase,
}

impl<TRIG, ECHO, CLK> Hcsr04<TRIG, ECHO, CLK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    CLK: Clock,
{
    /// Create a new driver
    ///
    /// # Arguments
    /// - `trigger`: Output connected to the sensor's TRIG line
    /// - `echo`: Input connected to the sensor's ECHO line
    /// - `clock`: Time source used for the trigger pulse and echo timing
    /// - `config`: Timeout, speed of sound and speed sampling interval
    ///
    /// The trigger line is driven low here on a best-effort basis. A pin
    /// that fails now fails again on the first measurement, which reports it
    /// as [`RangingError::Pin`].
    pub fn new(
        trigger: TRIG,
        echo: ECHO,
        clock: CLK,
        config: RangerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sensor = Self {
            trigger,
            echo,
            clock,
            config,
            phase: Phase::Idle,
        };
        sensor.trigger.set_low().ok();
        Ok(sensor)
    }

    /// Measure the distance to the nearest object
    ///
    /// `timeout` bounds the wait for the echo to rise (counted from the end
    /// of the trigger pulse) and, separately, the echo width.
    pub fn measure_distance(&mut self, timeout: Micros) -> Result<Distance, RangingError> {
        let result = self.run_cycle(timeout);

        self.phase = match result {
            Ok(_) => Phase::Done,
            Err(e) if e.is_timeout() => Phase::Timeout,
            Err(_) => Phase::Idle,
        };

        result
    }

    /// Estimate the closing speed from two distance samples
    ///
    /// Takes one distance, busy-waits for the configured interval, takes a
    /// second one and returns `(second - first) / interval`. This is a plain
    /// two-point difference: sensor noise is not filtered, and the interval
    /// does not include the time spent measuring.
    ///
    /// If either sample fails, its error is returned and no speed is
    /// produced.
    pub fn measure_speed(&mut self, timeout: Micros) -> Result<Speed, RangingError> {
        let first = self.measure_distance(timeout)?;
        self.clock.delay(self.config.speed_interval);
        let second = self.measure_distance(timeout)?;

        Ok(Speed::between(first, second, self.config.speed_interval))
    }

    /// Phase reached by the last measurement
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Get the configuration
    pub fn config(&self) -> &RangerConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: RangerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Update the speed of sound (e.g., from an air temperature reading)
    pub fn set_speed_of_sound(&mut self, speed_of_sound: SpeedOfSound) -> Result<(), ConfigError> {
        let mut config = self.config;
        config.speed_of_sound = speed_of_sound;
        self.set_config(config)
    }

    /// Get access to the clock
    pub fn clock(&self) -> &CLK {
        &self.clock
    }

    /// Release the pins and the clock
    pub fn release(self) -> (TRIG, ECHO, CLK) {
        (self.trigger, self.echo, self.clock)
    }

    fn run_cycle(&mut self, timeout: Micros) -> Result<Distance, RangingError> {
        self.phase = Phase::Idle;

        // A previous echo is still in flight; triggering now would time it
        if self.echo_active()? {
            return Err(RangingError::EchoBusy);
        }

        self.trigger_pulse()?;

        self.phase = Phase::AwaitEchoRise;
        let pulse_end = self.clock.now();
        while !self.echo_active()? {
            if self.clock.elapsed_since(pulse_end) >= timeout {
                return Err(RangingError::NoEcho);
            }
        }

        self.phase = Phase::AwaitEchoFall;
        let start = self.clock.now();
        while self.echo_active()? {
            if self.clock.elapsed_since(start) >= timeout {
                return Err(RangingError::EchoTooLong);
            }
        }
        let end = self.clock.now();

        Ok(Distance::from_echo(end - start, self.config.speed_of_sound))
    }

    fn trigger_pulse(&mut self) -> Result<(), RangingError> {
        self.phase = Phase::TriggerPulse;

        let raised = self.trigger.set_high().map_err(|_| RangingError::Pin);
        if raised.is_ok() {
            self.clock.delay(TRIGGER_PULSE);
        }

        // Back to idle polarity whatever happened above
        self.trigger.set_low().map_err(|_| RangingError::Pin)?;
        raised
    }

    fn echo_active(&mut self) -> Result<bool, RangingError> {
        self.echo.is_high().map_err(|_| RangingError::Pin)
    }
}

impl<TRIG, ECHO, CLK> DistanceSensor for Hcsr04<TRIG, ECHO, CLK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    CLK: Clock,
{
    fn read_distance(&mut self) -> Result<Distance, RangingError> {
        self.measure_distance(self.config.timeout)
    }

    fn read_speed(&mut self) -> Result<Speed, RangingError> {
        self.measure_speed(self.config.timeout)
    }
}
