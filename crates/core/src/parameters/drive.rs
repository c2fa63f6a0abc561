//! Motor drive and control loop parameters
//!
//! # Parameters
//!
//! - `MOT_PWM_MAX` - Duty word that means 100% on the enable pins
//! - `MOT_PWM_FREQ` - Enable pin PWM frequency in Hz
//! - `LOOP_PERIOD_MS` - Control loop sleep between iterations

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

pub const PARAM_MAX_DUTY: &str = "MOT_PWM_MAX";
pub const PARAM_PWM_FREQ: &str = "MOT_PWM_FREQ";
pub const PARAM_LOOP_PERIOD: &str = "LOOP_PERIOD_MS";

/// Full-scale 16-bit duty word
pub const DEFAULT_MAX_DUTY: u16 = u16::MAX;

/// L298N enable PWM frequency (Hz)
pub const DEFAULT_PWM_FREQ_HZ: u32 = 1_000;

/// Control loop period (ms)
pub const DEFAULT_LOOP_PERIOD_MS: u32 = 10;

const MAX_PWM_FREQ_HZ: u32 = 40_000;
const MAX_LOOP_PERIOD_MS: u32 = 1_000;

/// Drive configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveParams {
    /// Duty word for full speed
    pub max_duty: u16,
    /// Enable pin PWM frequency (Hz)
    pub pwm_freq_hz: u32,
    /// Control loop period (ms)
    pub loop_period_ms: u32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            max_duty: DEFAULT_MAX_DUTY,
            pwm_freq_hz: DEFAULT_PWM_FREQ_HZ,
            loop_period_ms: DEFAULT_LOOP_PERIOD_MS,
        }
    }
}

impl DriveParams {
    /// Register drive parameters with these values
    ///
    /// Values that do not fit an `i32` parameter are rejected.
    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        let as_int = |v: u32| i32::try_from(v).map_err(|_| ParameterError::OutOfRange);
        let entries = [
            (PARAM_MAX_DUTY, i32::from(self.max_duty)),
            (PARAM_PWM_FREQ, as_int(self.pwm_freq_hz)?),
            (PARAM_LOOP_PERIOD, as_int(self.loop_period_ms)?),
        ];
        for (name, value) in entries {
            store.register(name, ParamValue::Int(value), ParamFlags::empty())?;
        }
        Ok(())
    }

    /// Load drive parameters from the store
    ///
    /// Values that do not fit their integer type are rejected, not clamped.
    pub fn from_store(store: &ParameterStore) -> Result<Self, ParameterError> {
        let defaults = Self::default();

        let max_duty = read_int(store, PARAM_MAX_DUTY, defaults.max_duty as i32)?;
        let pwm_freq_hz = read_int(store, PARAM_PWM_FREQ, defaults.pwm_freq_hz as i32)?;
        let loop_period_ms = read_int(store, PARAM_LOOP_PERIOD, defaults.loop_period_ms as i32)?;

        let params = Self {
            max_duty: u16::try_from(max_duty).map_err(|_| ParameterError::OutOfRange)?,
            pwm_freq_hz: u32::try_from(pwm_freq_hz).map_err(|_| ParameterError::OutOfRange)?,
            loop_period_ms: u32::try_from(loop_period_ms)
                .map_err(|_| ParameterError::OutOfRange)?,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.max_duty == 0 {
            return Err(ParameterError::OutOfRange);
        }
        if self.pwm_freq_hz == 0 || self.pwm_freq_hz > MAX_PWM_FREQ_HZ {
            return Err(ParameterError::OutOfRange);
        }
        if self.loop_period_ms == 0 || self.loop_period_ms > MAX_LOOP_PERIOD_MS {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}

fn read_int(store: &ParameterStore, name: &str, default: i32) -> Result<i32, ParameterError> {
    match store.get(name) {
        None => Ok(default),
        Some(value) => value.as_i32().ok_or(ParameterError::InvalidValue),
    }
}
