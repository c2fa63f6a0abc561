//! IMU source with stale-reading fallback
//!
//! [`LastGoodImu`] wraps any [`ImuSource`]. When a read fails after at least
//! one good read of the same vector, the last good vector is returned and
//! a warning is logged. Before the first good read the error propagates.
//!
//! A stale reading (no new sample) is always bridged. A sensor fault is
//! bridged only until [`MAX_CONSECUTIVE_ERRORS`] reads in a row have failed;
//! from then on the fault is returned so the caller can halt.

use nalgebra::Vector3;
use slampibot_core::ahrs::{AhrsError, ImuSource};

/// Consecutive failed reads before the source is reported unhealthy
pub const MAX_CONSECUTIVE_ERRORS: u32 = 3;

pub struct LastGoodImu<S: ImuSource> {
    inner: S,
    last_accel: Option<Vector3<f32>>,
    last_mag: Option<Vector3<f32>>,
    consecutive_errors: u32,
}

impl<S: ImuSource> LastGoodImu<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last_accel: None,
            last_mag: None,
            consecutive_errors: 0,
        }
    }

    /// False once several reads in a row have failed
    pub fn is_healthy(&self) -> bool {
        self.consecutive_errors < MAX_CONSECUTIVE_ERRORS
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    fn fallback(
        &mut self,
        result: Result<Vector3<f32>, AhrsError>,
        last: Option<Vector3<f32>>,
        what: &str,
    ) -> Result<Vector3<f32>, AhrsError> {
        match result {
            Ok(v) => {
                self.consecutive_errors = 0;
                Ok(v)
            }
            Err(e) => {
                self.consecutive_errors = self.consecutive_errors.saturating_add(1);
                let bridged = e == AhrsError::StaleReading || self.is_healthy();
                match last {
                    Some(v) if bridged => {
                        crate::log_warn!("{} read failed ({}), reusing last good", what, e.as_str());
                        Ok(v)
                    }
                    Some(_) => {
                        crate::log_error!(
                            "{} read failed {} times in a row ({})",
                            what,
                            self.consecutive_errors,
                            e.as_str()
                        );
                        Err(e)
                    }
                    None => Err(e),
                }
            }
        }
    }
}

impl<S: ImuSource> ImuSource for LastGoodImu<S> {
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let result = self.inner.read_accel();
        let v = self.fallback(result, self.last_accel, "accel")?;
        self.last_accel = Some(v);
        Ok(v)
    }

    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let result = self.inner.read_mag();
        let v = self.fallback(result, self.last_mag, "mag")?;
        self.last_mag = Some(v);
        Ok(v)
    }
}
