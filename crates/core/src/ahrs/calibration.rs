//! IMU calibration data and application
//!
//! Applies supplied hard/soft iron correction to the magnetometer and
//! offset/scale correction to the accelerometer. Deriving the constants
//! is done offline; this module only applies them.

use nalgebra::Vector3;

use super::error::AhrsError;
use super::source::ImuSource;

/// Parameter names for calibration data
pub const PARAM_ACCEL_OFFSET_X: &str = "AHRS_ACC_OFS_X";
pub const PARAM_ACCEL_OFFSET_Y: &str = "AHRS_ACC_OFS_Y";
pub const PARAM_ACCEL_OFFSET_Z: &str = "AHRS_ACC_OFS_Z";
pub const PARAM_ACCEL_SCALE_X: &str = "AHRS_ACC_SCL_X";
pub const PARAM_ACCEL_SCALE_Y: &str = "AHRS_ACC_SCL_Y";
pub const PARAM_ACCEL_SCALE_Z: &str = "AHRS_ACC_SCL_Z";

pub const PARAM_MAG_OFFSET_X: &str = "AHRS_MAG_OFS_X";
pub const PARAM_MAG_OFFSET_Y: &str = "AHRS_MAG_OFS_Y";
pub const PARAM_MAG_OFFSET_Z: &str = "AHRS_MAG_OFS_Z";
pub const PARAM_MAG_SCALE_X: &str = "AHRS_MAG_SCL_X";
pub const PARAM_MAG_SCALE_Y: &str = "AHRS_MAG_SCL_Y";
pub const PARAM_MAG_SCALE_Z: &str = "AHRS_MAG_SCL_Z";

pub const PARAM_GYRO_OFFSET_X: &str = "AHRS_GYR_OFS_X";
pub const PARAM_GYRO_OFFSET_Y: &str = "AHRS_GYR_OFS_Y";
pub const PARAM_GYRO_OFFSET_Z: &str = "AHRS_GYR_OFS_Z";

/// Calibration data for the MPU6500 + AK8963 pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationData {
    /// Accelerometer offset (g), subtracted before scaling
    pub accel_offset: Vector3<f32>,

    /// Accelerometer scale factors (dimensionless)
    pub accel_scale: Vector3<f32>,

    /// Magnetometer hard iron offset (µT)
    pub mag_offset: Vector3<f32>,

    /// Magnetometer soft iron scale, diagonal only
    pub mag_scale: Vector3<f32>,

    /// Gyroscope offset (rad/s)
    ///
    /// Carried for telemetry consumers; the tilt/compass estimator does
    /// not use the gyro.
    pub gyro_offset: Vector3<f32>,
}

impl Default for CalibrationData {
    /// Identity calibration (no correction)
    fn default() -> Self {
        Self {
            accel_offset: Vector3::zeros(),
            accel_scale: Vector3::new(1.0, 1.0, 1.0),
            mag_offset: Vector3::zeros(),
            mag_scale: Vector3::new(1.0, 1.0, 1.0),
            gyro_offset: Vector3::zeros(),
        }
    }
}

impl CalibrationData {
    /// Bench calibration of the reference robot's IMU board
    pub fn reference_board() -> Self {
        Self {
            mag_offset: Vector3::new(33.39844, -0.1763678, -3.725391),
            mag_scale: Vector3::new(0.7810696, 0.8247207, 1.971716),
            gyro_offset: Vector3::new(-0.03383452, 0.02282055, -0.008768291),
            ..Default::default()
        }
    }

    /// Apply accelerometer calibration to raw reading
    ///
    /// ```text
    /// calibrated = (raw - offset) .* scale
    /// ```
    pub fn apply_accel_calibration(&self, raw: Vector3<f32>) -> Vector3<f32> {
        (raw - self.accel_offset).component_mul(&self.accel_scale)
    }

    /// Apply magnetometer calibration to raw reading
    ///
    /// ```text
    /// calibrated = (raw - hard_iron_offset) .* soft_iron_scale
    /// ```
    pub fn apply_mag_calibration(&self, raw: Vector3<f32>) -> Vector3<f32> {
        (raw - self.mag_offset).component_mul(&self.mag_scale)
    }
}

/// IMU source wrapper applying [`CalibrationData`] to every read
pub struct CalibratedImu<S: ImuSource> {
    inner: S,
    calibration: CalibrationData,
}

impl<S: ImuSource> CalibratedImu<S> {
    pub fn new(inner: S, calibration: CalibrationData) -> Self {
        Self { inner, calibration }
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calibration
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: ImuSource> ImuSource for CalibratedImu<S> {
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let raw = self.inner.read_accel()?;
        Ok(self.calibration.apply_accel_calibration(raw))
    }

    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let raw = self.inner.read_mag()?;
        Ok(self.calibration.apply_mag_calibration(raw))
    }
}
