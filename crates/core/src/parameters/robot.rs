//! Every tunable of the robot in one place

use super::error::ParameterError;
use super::storage::ParameterStore;
use super::{AttitudeParams, DriveParams};
use crate::ahrs::CalibrationData;

/// Attitude, drive and calibration parameters together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotParams {
    pub attitude: AttitudeParams,
    pub drive: DriveParams,
    pub calibration: CalibrationData,
}

impl Default for RobotParams {
    fn default() -> Self {
        Self {
            attitude: AttitudeParams::default(),
            drive: DriveParams::default(),
            calibration: CalibrationData::reference_board(),
        }
    }
}

impl RobotParams {
    /// Register every parameter with these values
    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        self.attitude.register(store)?;
        self.drive.register(store)?;
        self.calibration.register(store)
    }

    /// Store holding exactly these values
    pub fn to_store(&self) -> Result<ParameterStore, ParameterError> {
        let mut store = ParameterStore::new();
        self.register(&mut store)?;
        Ok(store)
    }

    /// Load and validate every group
    pub fn from_store(store: &ParameterStore) -> Result<Self, ParameterError> {
        Ok(Self {
            attitude: AttitudeParams::from_store(store)?,
            drive: DriveParams::from_store(store)?,
            calibration: CalibrationData::from_store(store)?,
        })
    }
}
