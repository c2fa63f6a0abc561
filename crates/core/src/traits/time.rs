//! Time source abstraction for control loop pacing.

/// Monotonic time source.
///
/// Hardware builds read the board timer; host tests and the simulator
/// supply their own counters.
///
/// # Example
///
/// ```
/// use slampibot_core::traits::TimeSource;
///
/// struct Fixed(u64);
///
/// impl TimeSource for Fixed {
///     fn now_us(&self) -> u64 {
///         self.0
///     }
/// }
///
/// let time = Fixed(12_500);
/// assert_eq!(time.now_ms(), 12);
/// assert_eq!(time.elapsed_since(2_500), 10_000);
/// ```
pub trait TimeSource {
    /// Milliseconds since start.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Microseconds since start.
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `reference_us`, saturating at zero.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
