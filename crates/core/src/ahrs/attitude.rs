//! Tilt + compass attitude estimator
//!
//! Produces pitch and roll from the gravity vector seen by the
//! accelerometer, yaw from the low-pass filtered magnetometer x/y
//! channels, and an 8-point compass heading from yaw.
//!
//! # Reference frame
//!
//! The estimator captures a pitch/roll bias from the very first reading
//! when it is constructed. Every later sample reports pitch and roll
//! relative to that starting pose, not to true earth-level. Yaw is never
//! bias-corrected.
//!
//! # Tilt formula
//!
//! ```text
//! roll  = atan2(-ax, sqrt(az² + ay²))
//! pitch = atan2(az, sign(ay) * sqrt(0.01·ax² + ay²))
//! ```
//!
//! The 0.01 weight on `ax` in the pitch denominator is an asymmetric
//! tilt-compensation approximation and must be kept as-is for numeric
//! compatibility with the robot's existing telemetry. `sign(ay)` keeps the
//! rotation direction when `ay` is near zero.

use core::f32::consts::PI;
use core::fmt;

use libm::{atan2f, copysignf, sqrtf};
use nalgebra::Vector3;

use super::error::AhrsError;
use super::heading::Heading;
use super::source::ImuSource;
use crate::filter::LowPassFilter;
use crate::parameters::AttitudeParams;

const RAD_TO_DEG: f32 = 180.0 / PI;

/// One attitude estimate
///
/// Produced fresh on every read; not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSample {
    /// Pitch in degrees, relative to the startup pose
    pub pitch: f32,
    /// Roll in degrees, relative to the startup pose
    pub roll: f32,
    /// Yaw in degrees, [0, 360)
    pub yaw: f32,
    /// Compass point for `yaw`; `None` only when yaw is not finite
    pub heading: Option<Heading>,
    /// Accelerometer vector the tilt was computed from (g)
    pub accel: Vector3<f32>,
}

impl fmt::Display for AttitudeSample {
    /// `roll pitch yaw` rounded to 0.1°
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {:.1} {:.1}", self.roll, self.pitch, self.yaw)
    }
}

/// Compute (pitch, roll) in degrees from an accelerometer vector
///
/// An all-zero vector yields (0, 0): `atan2(0, 0)` is defined as 0 and is
/// not treated as an error.
pub fn tilt_from_accel(accel: &Vector3<f32>) -> (f32, f32) {
    let (x, y, z) = (accel.x, accel.y, accel.z);

    let roll_rad = atan2f(-x, sqrtf(z * z + y * y));
    let pitch_rad = atan2f(z, copysignf(1.0, y) * sqrtf(0.01 * x * x + y * y));

    (pitch_rad * RAD_TO_DEG, roll_rad * RAD_TO_DEG)
}

/// Compute yaw in degrees [0, 360) from filtered magnetometer x/y
pub fn yaw_from_mag(filtered_x: f32, filtered_y: f32) -> f32 {
    let mut yaw = 90.0 - atan2f(filtered_y, filtered_x) * RAD_TO_DEG;

    if yaw < 0.0 {
        yaw += 360.0;
    }
    // A tiny negative yaw rounds to exactly 360.0 after the wrap
    if yaw >= 360.0 {
        yaw -= 360.0;
    }

    yaw
}

/// Accelerometer/magnetometer attitude estimator
///
/// Owns its IMU source, two independent magnetometer filters and the
/// startup pitch/roll bias.
///
/// # Example
///
/// ```
/// use slampibot_core::ahrs::{AttitudeEstimator, MockImu};
///
/// let mut estimator = AttitudeEstimator::new(MockImu::level()).unwrap();
/// assert_eq!(estimator.pitch_bias(), 0.0);
///
/// let sample = estimator.sample().unwrap();
/// assert_eq!(sample.pitch, 0.0);
/// assert_eq!(sample.roll, 0.0);
/// ```
pub struct AttitudeEstimator<S: ImuSource> {
    source: S,
    mag_x_filter: LowPassFilter,
    mag_y_filter: LowPassFilter,
    pitch_bias: f32,
    roll_bias: f32,
}

impl<S: ImuSource> AttitudeEstimator<S> {
    /// Create an estimator with default filter parameters
    ///
    /// Performs the first IMU read to capture the pitch/roll bias.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the bias reading fails.
    pub fn new(source: S) -> Result<Self, AhrsError> {
        Self::with_params(source, &AttitudeParams::default())
    }

    /// Create an estimator with explicit filter parameters
    ///
    /// The bias reading goes through the magnetometer filters like any
    /// other sample, so the filters are already one step in when this
    /// returns.
    pub fn with_params(source: S, params: &AttitudeParams) -> Result<Self, AhrsError> {
        let mut estimator = Self {
            source,
            mag_x_filter: LowPassFilter::with_alpha(params.lpf_alpha, params.mag_x_seed),
            mag_y_filter: LowPassFilter::with_alpha(params.lpf_alpha, params.mag_y_seed),
            pitch_bias: 0.0,
            roll_bias: 0.0,
        };

        let reference = estimator.sample()?;
        estimator.pitch_bias = reference.pitch;
        estimator.roll_bias = reference.roll;

        Ok(estimator)
    }

    /// Read the IMU and produce a new attitude sample
    ///
    /// # Errors
    ///
    /// Propagates the source's error. Filter state is left untouched when
    /// either read fails.
    pub fn sample(&mut self) -> Result<AttitudeSample, AhrsError> {
        let accel = self.source.read_accel()?;
        let mag = self.source.read_mag()?;
        Ok(self.estimate(&accel, &mag))
    }

    /// Produce an attitude sample from vectors read elsewhere
    ///
    /// Advances the magnetometer filters exactly like [`sample`](Self::sample).
    pub fn estimate(&mut self, accel: &Vector3<f32>, mag: &Vector3<f32>) -> AttitudeSample {
        let (pitch, roll) = tilt_from_accel(accel);

        let filtered_x = self.mag_x_filter.update(mag.x);
        let filtered_y = self.mag_y_filter.update(mag.y);
        let yaw = yaw_from_mag(filtered_x, filtered_y);

        AttitudeSample {
            pitch: pitch - self.pitch_bias,
            roll: roll - self.roll_bias,
            yaw,
            heading: Heading::from_yaw(yaw),
            accel: *accel,
        }
    }

    /// Pitch captured at construction (degrees)
    pub fn pitch_bias(&self) -> f32 {
        self.pitch_bias
    }

    /// Roll captured at construction (degrees)
    pub fn roll_bias(&self) -> f32 {
        self.roll_bias
    }

    /// Current (x, y) magnetometer filter outputs
    pub fn filtered_mag(&self) -> (f32, f32) {
        (self.mag_x_filter.value(), self.mag_y_filter.value())
    }

    /// Borrow the IMU source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the IMU source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahrs::MockImu;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_level_reference_has_zero_bias() {
        let mut estimator = AttitudeEstimator::new(MockImu::level()).unwrap();

        assert_eq!(estimator.pitch_bias(), 0.0);
        assert_eq!(estimator.roll_bias(), 0.0);

        let sample = estimator.sample().unwrap();
        assert_eq!(sample.pitch, 0.0);
        assert_eq!(sample.roll, 0.0);
    }

    #[test]
    fn test_first_sample_after_construction_is_zero_tilt() {
        let tilted = Vector3::new(0.3, 0.8, 0.5);
        let imu = MockImu::new(tilted, Vector3::new(20.0, 5.0, -30.0));
        let mut estimator = AttitudeEstimator::new(imu).unwrap();

        assert!(estimator.pitch_bias().abs() > 1.0);
        assert!(estimator.roll_bias().abs() > 1.0);

        let sample = estimator.sample().unwrap();
        assert!(sample.pitch.abs() < EPSILON);
        assert!(sample.roll.abs() < EPSILON);
    }

    #[test]
    fn test_bias_is_frozen() {
        let mut estimator = AttitudeEstimator::new(MockImu::level()).unwrap();

        estimator
            .source_mut()
            .set_accel(Vector3::new(-0.5, 0.5, 0.7));
        let tilted = estimator.sample().unwrap();

        assert_eq!(estimator.pitch_bias(), 0.0);
        assert_eq!(estimator.roll_bias(), 0.0);
        assert!(tilted.pitch > 0.0);
        assert!(tilted.roll > 0.0);
    }

    #[test]
    fn test_tilt_known_values() {
        // Rolled: gravity split between -x and y
        let (pitch, roll) = tilt_from_accel(&Vector3::new(-1.0, 1.0, 0.0));
        assert!((roll - 45.0).abs() < EPSILON);
        assert!(pitch.abs() < EPSILON);

        // Pitched: gravity split between z and y
        let (pitch, roll) = tilt_from_accel(&Vector3::new(0.0, 1.0, 1.0));
        assert!((pitch - 45.0).abs() < EPSILON);
        assert!(roll.abs() < EPSILON);
    }

    #[test]
    fn test_pitch_uses_weighted_x_term() {
        let accel = Vector3::new(1.0, 1.0, 1.0);
        let (pitch, _) = tilt_from_accel(&accel);
        let expected = atan2f(1.0, sqrtf(0.01 + 1.0)) * RAD_TO_DEG;
        assert!((pitch - expected).abs() < EPSILON);
    }

    #[test]
    fn test_pitch_sign_follows_y() {
        let (up, _) = tilt_from_accel(&Vector3::new(0.0, 1.0, 0.5));
        let (down, _) = tilt_from_accel(&Vector3::new(0.0, -1.0, 0.5));
        assert!(up > 0.0 && up < 90.0);
        assert!(down > 90.0);
    }

    #[test]
    fn test_degenerate_accel_is_zero() {
        let (pitch, roll) = tilt_from_accel(&Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(pitch, 0.0);
        assert_eq!(roll, 0.0);
    }

    #[test]
    fn test_yaw_known_values() {
        // Field along +x: 90 - 0
        assert!((yaw_from_mag(1.0, 0.0) - 90.0).abs() < EPSILON);
        // Field along +y: 90 - 90
        assert!(yaw_from_mag(0.0, 1.0).abs() < EPSILON);
        // Field along -x: 90 - 180 + 360
        assert!((yaw_from_mag(-1.0, 0.0) - 270.0).abs() < EPSILON);
        // Field along -y: 90 + 90
        assert!((yaw_from_mag(0.0, -1.0) - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_yaw_always_in_range() {
        let values = [
            -1000.0, -55.5, -1.0, -1.0e-6, -0.0, 0.0, 1.0e-6, 0.3, 1.0, 42.0, 1.0e5,
        ];
        for &x in &values {
            for &y in &values {
                let yaw = yaw_from_mag(x, y);
                assert!(
                    (0.0..360.0).contains(&yaw),
                    "yaw {} out of range for x={}, y={}",
                    yaw,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_yaw_is_not_bias_corrected() {
        let imu = MockImu::new(Vector3::new(0.3, 0.8, 0.5), Vector3::new(0.0, 10.0, 0.0));
        let mut estimator = AttitudeEstimator::new(imu).unwrap();
        let sample = estimator.sample().unwrap();

        // Both filters move toward (0, 10), so yaw stays at 0
        assert!(sample.yaw.abs() < EPSILON);
        assert_eq!(sample.heading, Some(Heading::N));
    }

    #[test]
    fn test_mag_filters_advance_each_sample() {
        let imu = MockImu::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(10.0, -10.0, 0.0));
        let mut estimator = AttitudeEstimator::new(imu).unwrap();

        // One step in from construction
        let (fx, fy) = estimator.filtered_mag();
        assert!((fx - 2.0).abs() < EPSILON);
        assert!((fy + 2.0).abs() < EPSILON);

        estimator.sample().unwrap();
        let (fx, fy) = estimator.filtered_mag();
        assert!((fx - 3.6).abs() < EPSILON);
        assert!((fy + 3.6).abs() < EPSILON);
    }

    #[test]
    fn test_heading_follows_filtered_yaw() {
        let imu = MockImu::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let mut estimator = AttitudeEstimator::new(imu).unwrap();

        let sample = estimator.sample().unwrap();
        assert!((sample.yaw - 90.0).abs() < EPSILON);
        assert_eq!(sample.heading, Some(Heading::E));

        // Swing the field to -x; the filter needs several samples to cross over
        estimator.source_mut().set_mag(Vector3::new(-1.0, 0.0, 0.0));
        let first = estimator.sample().unwrap();
        assert_eq!(first.heading, Some(Heading::E));

        for _ in 0..20 {
            estimator.sample().unwrap();
        }
        let settled = estimator.sample().unwrap();
        assert!((settled.yaw - 270.0).abs() < 0.01);
        assert_eq!(settled.heading, Some(Heading::W));
    }

    #[test]
    fn test_construction_failure_propagates() {
        let mut imu = MockImu::level();
        imu.set_failure(Some(AhrsError::SensorError));
        let result = AttitudeEstimator::new(imu);
        assert!(matches!(result, Err(AhrsError::SensorError)));
    }

    #[test]
    fn test_failed_read_leaves_filters_untouched() {
        let mut estimator = AttitudeEstimator::new(MockImu::level()).unwrap();
        let before = estimator.filtered_mag();

        estimator
            .source_mut()
            .set_failure(Some(AhrsError::StaleReading));
        assert_eq!(estimator.sample(), Err(AhrsError::StaleReading));
        assert_eq!(estimator.filtered_mag(), before);
    }

    #[test]
    fn test_custom_alpha() {
        let params = AttitudeParams {
            lpf_alpha: 0.0,
            ..Default::default()
        };
        let imu = MockImu::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        let estimator = AttitudeEstimator::with_params(imu, &params).unwrap();
        assert_eq!(estimator.filtered_mag(), (-1.0, 0.0));
    }

    #[test]
    fn test_display_rounds_to_tenth() {
        extern crate std;
        use std::format;

        let sample = AttitudeSample {
            pitch: 1.26,
            roll: -0.04,
            yaw: 359.96,
            heading: Some(Heading::N),
            accel: Vector3::zeros(),
        };
        assert_eq!(format!("{}", sample), "-0.0 1.3 360.0");
    }
}
