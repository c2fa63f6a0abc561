//! Calibration constants as parameters
//!
//! Registers the fifteen `AHRS_*_OFS_*` / `AHRS_*_SCL_*` entries with the
//! reference board's bench values and loads them back into a
//! [`CalibrationData`].

use nalgebra::Vector3;

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::ahrs::calibration::*;

type Triple = [&'static str; 3];

const ACCEL_OFFSET: Triple = [
    PARAM_ACCEL_OFFSET_X,
    PARAM_ACCEL_OFFSET_Y,
    PARAM_ACCEL_OFFSET_Z,
];
const ACCEL_SCALE: Triple = [
    PARAM_ACCEL_SCALE_X,
    PARAM_ACCEL_SCALE_Y,
    PARAM_ACCEL_SCALE_Z,
];
const MAG_OFFSET: Triple = [PARAM_MAG_OFFSET_X, PARAM_MAG_OFFSET_Y, PARAM_MAG_OFFSET_Z];
const MAG_SCALE: Triple = [PARAM_MAG_SCALE_X, PARAM_MAG_SCALE_Y, PARAM_MAG_SCALE_Z];
const GYRO_OFFSET: Triple = [
    PARAM_GYRO_OFFSET_X,
    PARAM_GYRO_OFFSET_Y,
    PARAM_GYRO_OFFSET_Z,
];

fn register_vector(
    store: &mut ParameterStore,
    names: Triple,
    value: Vector3<f32>,
) -> Result<(), ParameterError> {
    for (name, component) in names.iter().zip(value.iter()) {
        store.register(name, ParamValue::Float(*component), ParamFlags::CALIBRATION)?;
    }
    Ok(())
}

fn load_vector(store: &ParameterStore, names: Triple, default: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        store.get_f32_or(names[0], default.x),
        store.get_f32_or(names[1], default.y),
        store.get_f32_or(names[2], default.z),
    )
}

impl CalibrationData {
    /// Register calibration parameters with this calibration's values
    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        register_vector(store, ACCEL_OFFSET, self.accel_offset)?;
        register_vector(store, ACCEL_SCALE, self.accel_scale)?;
        register_vector(store, MAG_OFFSET, self.mag_offset)?;
        register_vector(store, MAG_SCALE, self.mag_scale)?;
        register_vector(store, GYRO_OFFSET, self.gyro_offset)?;
        Ok(())
    }

    /// Load calibration from the store, falling back to the reference board
    pub fn from_store(store: &ParameterStore) -> Result<Self, ParameterError> {
        let defaults = Self::reference_board();
        let data = Self {
            accel_offset: load_vector(store, ACCEL_OFFSET, defaults.accel_offset),
            accel_scale: load_vector(store, ACCEL_SCALE, defaults.accel_scale),
            mag_offset: load_vector(store, MAG_OFFSET, defaults.mag_offset),
            mag_scale: load_vector(store, MAG_SCALE, defaults.mag_scale),
            gyro_offset: load_vector(store, GYRO_OFFSET, defaults.gyro_offset),
        };
        data.validate()?;
        Ok(data)
    }

    /// Scales must be finite and non-zero; offsets finite
    pub fn validate(&self) -> Result<(), ParameterError> {
        let finite = |v: &Vector3<f32>| v.iter().all(|c| c.is_finite());
        let usable_scale = |v: &Vector3<f32>| v.iter().all(|c| c.is_finite() && *c != 0.0);

        if !finite(&self.accel_offset) || !finite(&self.mag_offset) || !finite(&self.gyro_offset)
        {
            return Err(ParameterError::OutOfRange);
        }
        if !usable_scale(&self.accel_scale) || !usable_scale(&self.mag_scale) {
            return Err(ParameterError::OutOfRange);
        }
        Ok(())
    }
}
