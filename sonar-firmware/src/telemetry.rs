//! Telemetry over the HC-05 link
//!
//! Each reading is sent as one text line:
//!
//! ```text
//! t=1500 d=171.50
//! t=2000 d=-1.00 v=-120
//! ```
//!
//! `d` is the distance in centimetres, `-1` when the measurement timed out
//! or failed. `v` is the closing speed in mm/s, present only when speed
//! reporting is enabled, and `?` when no speed could be determined.

use core::fmt::Write;

use sonar_core::traits::distance_cm_or_sentinel;
use sonar_drivers::bluetooth::Hc05;
use sonar_hal_rp2040::RpUart;

use crate::ranging::Reading;

/// HC-05 on a blocking UART
pub type Link = Hc05<RpUart<'static>>;

/// Send one reading as a text line
pub fn send_reading(link: &mut Link, reading: &Reading) -> core::fmt::Result {
    write!(
        link,
        "t={} d={:.2}",
        reading.at_ms,
        distance_cm_or_sentinel(&reading.distance)
    )?;

    match reading.speed {
        Some(Ok(speed)) => write!(link, " v={}", speed.mm_per_s())?,
        Some(Err(_)) => link.write_str(" v=?")?,
        None => {}
    }

    link.write_str("\r\n")
}
