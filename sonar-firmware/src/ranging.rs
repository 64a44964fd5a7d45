//! Measurement cycle
//!
//! The HC-SR04 driver busy-waits on the hardware timer, so a cycle blocks
//! the main loop for up to two echo timeouts, plus the speed interval when
//! speed reporting is enabled.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::Instant;

use sonar_core::time::Timer;
use sonar_core::traits::{DistanceSensor, RangingError};
use sonar_core::units::{Distance, Speed};
use sonar_drivers::ultrasonic::Hcsr04;
use sonar_hal_rp2040::PwmCounter;

/// HC-SR04 on GPIO, timed by the PWM-slice timer
pub type Ranger = Hcsr04<Output<'static>, Input<'static>, Timer<'static, PwmCounter<'static>>>;

/// One measurement cycle
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Uptime at the start of the cycle (ms)
    pub at_ms: u64,
    /// Distance, or why none was obtained
    pub distance: Result<Distance, RangingError>,
    /// Closing speed, when speed reporting is enabled
    pub speed: Option<Result<Speed, RangingError>>,
}

/// Run one cycle: a distance, then optionally a speed
pub fn measure(ranger: &mut Ranger, with_speed: bool) -> Reading {
    let at_ms = Instant::now().as_millis();

    let distance = ranger.read_distance();
    match distance {
        Ok(d) => debug!("Distance: {} mm", d.mm()),
        Err(e) => log_failure("Distance", e),
    }

    let speed = with_speed.then(|| {
        let speed = ranger.read_speed();
        match speed {
            Ok(s) => debug!("Speed: {} mm/s", s.mm_per_s()),
            Err(e) => log_failure("Speed", e),
        }
        speed
    });

    Reading {
        at_ms,
        distance,
        speed,
    }
}

fn log_failure(what: &str, e: RangingError) {
    if e.is_timeout() {
        // Open air: nothing within range
        debug!("{}: no object in range ({})", what, e);
    } else {
        warn!("{}: measurement failed: {}", what, e);
    }
}
