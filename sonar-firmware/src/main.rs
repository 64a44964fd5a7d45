//! Sonar - Ultrasonic Ranging Firmware
//!
//! Main firmware binary for RP2040 boards with an HC-SR04 ranging module
//! and an HC-05 Bluetooth link.
//!
//! Echo pulses are timed against a PWM slice used as a free-running 16-bit
//! counter, extended to a wide clock by counting its wraps in the
//! `PWM_IRQ_WRAP` interrupt.
//!
//! The main loop is the only thread of control: measure, report, wait.
//! The wrap interrupt is the only code that preempts it.
//!
//! # Wiring
//!
//! | Signal        | GPIO |
//! |---------------|------|
//! | HC-SR04 TRIG  | 2    |
//! | HC-SR04 ECHO  | 3    |
//! | HC-05 RXD     | 4 (UART1 TX) |
//! | HC-05 TXD     | 5 (UART1 RX) |
//!
//! The HC-SR04 echo output is 5 V; use a divider in front of GPIO 3.

#![no_std]
#![no_main]

use defmt::*;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::uart::Uart;
use embassy_time::{block_for, Duration};
use {defmt_rtt as _, panic_probe as _};

use sonar_core::time::{OverflowCounter, Timer};
use sonar_drivers::bluetooth::Hc05;
use sonar_drivers::ultrasonic::Hcsr04;
use sonar_hal::UartConfig;
use sonar_hal_rp2040::counter::acknowledge_wrap;
use sonar_hal_rp2040::uart::rp_config;
use sonar_hal_rp2040::{PwmCounter, RpUart, UartPort};

mod config;
mod ranging;
mod telemetry;

/// PWM slice used as the timer counter (PWM_SLICE0)
const COUNTER_SLICE: u8 = 0;

/// Counter wraps since the last timer restart
static OVERFLOWS: OverflowCounter = OverflowCounter::new();

/// Counter wrap interrupt, shared by all PWM slices
#[interrupt]
fn PWM_IRQ_WRAP() {
    if acknowledge_wrap(COUNTER_SLICE) {
        OVERFLOWS.increment();
    }
}

/// Main entry point
#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Sonar firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Time against the clock the PWM actually counts
    let clk_sys = embassy_rp::clocks::clk_sys_freq();
    if clk_sys != config::TIMER.clock_hz {
        warn!(
            "sonar.toml clock_hz={} differs from clk_sys={}, using clk_sys",
            config::TIMER.clock_hz,
            clk_sys
        );
    }
    let timer_config = config::TIMER.with_clock_hz(clk_sys);

    // Interrupt-extended timer on PWM slice 0
    let counter = PwmCounter::new(p.PWM_SLICE0);
    let timer = unwrap!(Timer::new(counter, &OVERFLOWS, &timer_config));
    info!(
        "Timer: {} Hz / {}, tick {} ns, wrap every {} us",
        timer.clock_hz(),
        timer.prescaler().divisor(),
        timer.tick_period_ns(),
        timer.wrap_period().as_micros()
    );

    // HC-SR04
    let trigger = Output::new(p.PIN_2, Level::Low);
    let echo = Input::new(p.PIN_3, Pull::Down);
    let mut ranger = unwrap!(Hcsr04::new(trigger, echo, timer, config::RANGER));
    info!(
        "Ranger: timeout {} us, max range {} mm",
        config::RANGER.timeout.as_micros(),
        config::RANGER.max_range().mm()
    );

    // HC-05 on UART1
    let link_config = UartConfig {
        baudrate: config::BLUETOOTH_BAUDRATE,
        ..UartConfig::hc05_default()
    };
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, rp_config(&link_config));
    let mut link = Hc05::new(RpUart::new(uart, UartPort::Uart1));
    info!("Bluetooth link on UART1 at {} baud", link_config.baudrate);

    info!("Firmware running");

    let interval = Duration::from_millis(config::REPORT_INTERVAL_MS);
    loop {
        let reading = ranging::measure(&mut ranger, config::REPORT_SPEED);

        if telemetry::send_reading(&mut link, &reading).is_err() {
            warn!("Bluetooth link write failed");
        }

        block_for(interval);
    }
}
