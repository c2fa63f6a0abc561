//! Mock Timer implementation for testing

use slampibot_core::traits::TimeSource;

use crate::platform::{traits::TimerInterface, Result};

/// Mock Timer implementation
///
/// Delays advance simulated time instantly.
#[derive(Debug, Default)]
pub struct MockTimer {
    now_us: u64,
    delays: u32,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of delay calls so far
    pub fn delays(&self) -> u32 {
        self.delays
    }
}

impl TimeSource for MockTimer {
    fn now_us(&self) -> u64 {
        self.now_us
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.now_us = self.now_us.saturating_add(us as u64);
        self.delays += 1;
        Ok(())
    }
}
