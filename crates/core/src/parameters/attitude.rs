//! Attitude estimator parameters
//!
//! # Parameters
//!
//! - `AHRS_LPF_ALPHA` - Magnetometer low-pass weight on the previous value
//! - `AHRS_MAGX_SEED` - Initial filtered value of the magnetometer x channel
//! - `AHRS_MAGY_SEED` - Initial filtered value of the magnetometer y channel

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::filter::DEFAULT_ALPHA;

pub const PARAM_LPF_ALPHA: &str = "AHRS_LPF_ALPHA";
pub const PARAM_MAG_X_SEED: &str = "AHRS_MAGX_SEED";
pub const PARAM_MAG_Y_SEED: &str = "AHRS_MAGY_SEED";

/// Attitude estimator configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeParams {
    /// Low-pass filter weight on the previous value, [0.0, 1.0]
    pub lpf_alpha: f32,
    /// Seed for the magnetometer x filter
    pub mag_x_seed: f32,
    /// Seed for the magnetometer y filter
    pub mag_y_seed: f32,
}

impl Default for AttitudeParams {
    fn default() -> Self {
        Self {
            lpf_alpha: DEFAULT_ALPHA,
            mag_x_seed: 0.0,
            mag_y_seed: 0.0,
        }
    }
}

impl AttitudeParams {
    /// Register attitude parameters with these values
    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        let entries = [
            (PARAM_LPF_ALPHA, self.lpf_alpha),
            (PARAM_MAG_X_SEED, self.mag_x_seed),
            (PARAM_MAG_Y_SEED, self.mag_y_seed),
        ];
        for (name, value) in entries {
            store.register(name, ParamValue::Float(value), ParamFlags::empty())?;
        }
        Ok(())
    }

    /// Load attitude parameters from the store
    ///
    /// Missing entries fall back to defaults. The result is validated.
    pub fn from_store(store: &ParameterStore) -> Result<Self, ParameterError> {
        let defaults = Self::default();
        let params = Self {
            lpf_alpha: store.get_f32_or(PARAM_LPF_ALPHA, defaults.lpf_alpha),
            mag_x_seed: store.get_f32_or(PARAM_MAG_X_SEED, defaults.mag_x_seed),
            mag_y_seed: store.get_f32_or(PARAM_MAG_Y_SEED, defaults.mag_y_seed),
        };
        params.validate()?;
        Ok(params)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(0.0..=1.0).contains(&self.lpf_alpha) {
            return Err(ParameterError::OutOfRange);
        }
        if !self.mag_x_seed.is_finite() || !self.mag_y_seed.is_finite() {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}
