//! Timer interface trait

use slampibot_core::traits::TimeSource;

use crate::platform::Result;

/// Blocking delay on top of a monotonic clock
///
/// The clock half comes from [`TimeSource`]; implementations add the
/// ability to wait.
pub trait TimerInterface: TimeSource {
    /// Block for at least `us` microseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the delay cannot be performed.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }
}
