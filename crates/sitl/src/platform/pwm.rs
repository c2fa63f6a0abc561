//! Simulated PWM peripheral for SITL.
//!
//! A `SitlPwm` is a handle onto a shared channel. The motor driver owns one
//! handle and writes the duty; the simulated robot keeps a clone and reads
//! what the pin is outputting.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use slampibot::platform::error::PwmError;
use slampibot::platform::{PlatformError, PwmInterface, Result};

#[derive(Debug)]
struct Channel {
    duty_bits: AtomicU32,
    frequency: AtomicU32,
    enabled: AtomicBool,
}

/// Simulated PWM channel with duty cycle tracking.
#[derive(Debug, Clone)]
pub struct SitlPwm {
    pin: u8,
    channel: Arc<Channel>,
}

impl SitlPwm {
    /// Create a new SITL PWM channel on the given pin.
    pub fn new(pin: u8, frequency: u32, duty_cycle: f32) -> Self {
        Self {
            pin,
            channel: Arc::new(Channel {
                duty_bits: AtomicU32::new(duty_cycle.clamp(0.0, 1.0).to_bits()),
                frequency: AtomicU32::new(frequency),
                enabled: AtomicBool::new(false),
            }),
        }
    }

    /// Get the pin number.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Duty actually present on the pin; zero while output is disabled.
    pub fn output(&self) -> f32 {
        if self.is_enabled() {
            self.duty_cycle()
        } else {
            0.0
        }
    }
}

impl PwmInterface for SitlPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PlatformError::Pwm(PwmError::InvalidDutyCycle));
        }
        self.channel
            .duty_bits
            .store(duty_cycle.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        f32::from_bits(self.channel.duty_bits.load(Ordering::Relaxed))
    }

    fn set_frequency(&mut self, frequency: u32) -> Result<()> {
        if frequency == 0 {
            return Err(PlatformError::Pwm(PwmError::InvalidFrequency));
        }
        self.channel.frequency.store(frequency, Ordering::Relaxed);
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.channel.frequency.load(Ordering::Relaxed)
    }

    fn enable(&mut self) {
        self.channel.enabled.store(true, Ordering::Relaxed);
    }

    fn disable(&mut self) {
        self.channel.enabled.store(false, Ordering::Relaxed);
    }

    fn is_enabled(&self) -> bool {
        self.channel.enabled.load(Ordering::Relaxed)
    }
}
