//! IMU sample source abstraction
//!
//! The attitude estimator pulls accelerometer and magnetometer vectors
//! through [`ImuSource`]. Implementations wrap the actual sensor driver
//! (MPU6500 + AK8963 on the robot, a simulator on the host) and return
//! values already corrected for offset and scale.

use nalgebra::Vector3;

use super::error::AhrsError;

/// Raw vector source for the attitude pipeline
///
/// Both reads are fast synchronous calls. Accelerometer values are in g,
/// magnetometer values in µT.
pub trait ImuSource {
    /// Read the accelerometer vector (g)
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError>;

    /// Read the magnetometer vector (µT)
    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError>;
}

impl<T: ImuSource + ?Sized> ImuSource for &mut T {
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
        (**self).read_accel()
    }

    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
        (**self).read_mag()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock IMU returning programmable vectors
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use slampibot_core::ahrs::{ImuSource, MockImu};
///
/// let mut imu = MockImu::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
/// assert_eq!(imu.read_accel().unwrap().y, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct MockImu {
    accel: Vector3<f32>,
    mag: Vector3<f32>,
    failure: Option<AhrsError>,
    reads: u32,
}

impl MockImu {
    /// Create a mock returning the given vectors on every read
    pub fn new(accel: Vector3<f32>, mag: Vector3<f32>) -> Self {
        Self {
            accel,
            mag,
            failure: None,
            reads: 0,
        }
    }

    /// Mock lying level with the magnetometer pointing along +x
    pub fn level() -> Self {
        Self::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0))
    }

    /// Replace the accelerometer vector
    pub fn set_accel(&mut self, accel: Vector3<f32>) {
        self.accel = accel;
    }

    /// Replace the magnetometer vector
    pub fn set_mag(&mut self, mag: Vector3<f32>) {
        self.mag = mag;
    }

    /// Make subsequent reads fail with `error` (or succeed again with `None`)
    pub fn set_failure(&mut self, error: Option<AhrsError>) {
        self.failure = error;
    }

    /// Number of successful accelerometer reads so far
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl ImuSource for MockImu {
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        self.reads += 1;
        Ok(self.accel)
    }

    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
        if let Some(e) = self.failure {
            return Err(e);
        }
        Ok(self.mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_programmed_vectors() {
        let mut imu = MockImu::level();
        assert_eq!(imu.read_accel().unwrap(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(imu.read_mag().unwrap(), Vector3::new(1.0, 0.0, 0.0));

        imu.set_mag(Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(imu.read_mag().unwrap().y, 2.0);
        assert_eq!(imu.reads(), 1);
    }

    #[test]
    fn test_mock_failure() {
        let mut imu = MockImu::level();
        imu.set_failure(Some(AhrsError::SensorError));
        assert_eq!(imu.read_accel(), Err(AhrsError::SensorError));
        assert_eq!(imu.read_mag(), Err(AhrsError::SensorError));

        imu.set_failure(None);
        assert!(imu.read_accel().is_ok());
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn read_once<S: ImuSource>(mut source: S) {
            source.read_accel().unwrap();
        }

        let mut imu = MockImu::level();
        read_once(&mut imu);
        read_once(&mut imu);
        assert_eq!(imu.reads(), 2);
    }
}
