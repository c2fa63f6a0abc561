//! AHRS (Attitude and Heading Reference System) types and utilities
//!
//! Accelerometer tilt + filtered magnetometer yaw estimation for a
//! two-wheeled robot. Sensor bus access lives behind the [`ImuSource`]
//! trait; bus drivers and calibration-constant derivation are outside
//! this crate.

pub mod attitude;
pub mod calibration;
pub mod error;
pub mod heading;
pub mod source;

pub use attitude::{tilt_from_accel, yaw_from_mag, AttitudeEstimator, AttitudeSample};
pub use calibration::{
    CalibratedImu, CalibrationData, PARAM_ACCEL_OFFSET_X, PARAM_ACCEL_OFFSET_Y,
    PARAM_ACCEL_OFFSET_Z, PARAM_ACCEL_SCALE_X, PARAM_ACCEL_SCALE_Y, PARAM_ACCEL_SCALE_Z,
    PARAM_GYRO_OFFSET_X, PARAM_GYRO_OFFSET_Y, PARAM_GYRO_OFFSET_Z, PARAM_MAG_OFFSET_X,
    PARAM_MAG_OFFSET_Y, PARAM_MAG_OFFSET_Z, PARAM_MAG_SCALE_X, PARAM_MAG_SCALE_Y,
    PARAM_MAG_SCALE_Z,
};
pub use error::AhrsError;
pub use heading::Heading;
pub use source::{ImuSource, MockImu};
