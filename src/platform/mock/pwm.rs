//! Mock PWM implementation for testing

use crate::platform::{
    error::{PlatformError, PwmError},
    traits::{PwmConfig, PwmInterface},
    Result,
};

/// Mock PWM implementation
///
/// Tracks duty cycle, frequency, enable state and write count.
#[derive(Debug)]
pub struct MockPwm {
    duty_cycle: f32,
    frequency: u32,
    enabled: bool,
    writes: u32,
    fail: bool,
}

impl MockPwm {
    /// Create a new mock PWM
    pub fn new(config: PwmConfig) -> Self {
        Self {
            duty_cycle: config.duty_cycle,
            frequency: config.frequency,
            enabled: false,
            writes: 0,
            fail: false,
        }
    }

    /// Make every following duty write fail
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Number of successful duty writes
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for MockPwm {
    fn default() -> Self {
        Self::new(PwmConfig::default())
    }
}

impl PwmInterface for MockPwm {
    fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        if self.fail {
            return Err(PlatformError::Pwm(PwmError::ChannelUnavailable));
        }
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(PlatformError::Pwm(PwmError::InvalidDutyCycle));
        }
        self.duty_cycle = duty_cycle;
        self.writes += 1;
        Ok(())
    }

    fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    fn set_frequency(&mut self, frequency: u32) -> Result<()> {
        if frequency == 0 {
            return Err(PlatformError::Pwm(PwmError::InvalidFrequency));
        }
        self.frequency = frequency;
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
