//! Simulated time source for SITL.
//!
//! Wraps a shared atomic counter for simulation time, allowing the
//! simulated robot and the control loop to share a consistent time
//! reference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use slampibot::platform::{Result, TimerInterface};
use slampibot_core::traits::TimeSource;

/// Simulated time source backed by a shared atomic counter.
///
/// Multiple clones share the same underlying counter. Delays advance the
/// counter without blocking.
#[derive(Debug, Clone)]
pub struct SitlTimeSource {
    time_us: Arc<AtomicU64>,
}

impl SitlTimeSource {
    /// Create a new time source starting at zero.
    pub fn new() -> Self {
        Self {
            time_us: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance simulation time by the given number of microseconds.
    pub fn advance_us(&self, us: u64) {
        self.time_us.fetch_add(us, Ordering::Relaxed);
    }

    /// Set simulation time to an absolute value.
    pub fn set_us(&self, us: u64) {
        self.time_us.store(us, Ordering::Relaxed);
    }
}

impl Default for SitlTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SitlTimeSource {
    fn now_us(&self) -> u64 {
        self.time_us.load(Ordering::Relaxed)
    }
}

impl TimerInterface for SitlTimeSource {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.advance_us(us as u64);
        Ok(())
    }
}
