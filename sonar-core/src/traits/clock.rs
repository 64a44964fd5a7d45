//! Time source trait

use crate::time::Micros;

/// Time source for bounded busy-wait loops
///
/// Implemented by [`crate::time::Timer`] on hardware. Drivers take any
/// `Clock`, so polling loops can be exercised against a simulated clock.
pub trait Clock {
    /// Time elapsed since the last restart of the clock
    fn now(&self) -> Micros;

    /// Busy-wait for at least `duration`
    ///
    /// May restart the clock: readings taken before the call must not be
    /// compared with readings taken after it.
    fn delay(&mut self, duration: Micros);

    /// Time elapsed since `since`
    fn elapsed_since(&self, since: Micros) -> Micros {
        self.now() - since
    }
}
