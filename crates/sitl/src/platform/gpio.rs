//! Simulated GPIO peripheral for SITL.
//!
//! The level is shared between clones so the simulated robot can observe
//! the direction pins the motor driver writes. The mode belongs to each
//! handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use slampibot::platform::error::GpioError;
use slampibot::platform::{GpioInterface, GpioMode, PlatformError, Result};

/// Simulated GPIO pin with state tracking.
#[derive(Debug, Clone)]
pub struct SitlGpio {
    pin: u8,
    level: Arc<AtomicBool>,
    mode: GpioMode,
}

impl SitlGpio {
    /// Create a new GPIO pin configured as output (default low).
    pub fn new_output(pin: u8) -> Self {
        Self {
            pin,
            level: Arc::new(AtomicBool::new(false)),
            mode: GpioMode::OutputPushPull,
        }
    }

    /// Create a new GPIO pin configured as input.
    pub fn new_input(pin: u8) -> Self {
        Self {
            mode: GpioMode::Input,
            ..Self::new_output(pin)
        }
    }

    /// Get the pin number.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Inject a level (for simulating external input).
    pub fn inject_state(&self, high: bool) {
        self.level.store(high, Ordering::Relaxed);
    }

    fn write(&mut self, high: bool) -> Result<()> {
        match self.mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => {
                self.level.store(high, Ordering::Relaxed);
                Ok(())
            }
            _ => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }
}

impl GpioInterface for SitlGpio {
    fn set_high(&mut self) -> Result<()> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.write(false)
    }

    fn read(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
