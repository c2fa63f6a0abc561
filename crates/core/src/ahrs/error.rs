//! AHRS error types

use core::fmt;

/// Errors surfaced by IMU sources
///
/// The attitude math itself cannot fail; every variant here originates
/// in the sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AhrsError {
    /// Sensor communication failed
    SensorError,
    /// Sensor returned a reading flagged as stale (data not ready)
    StaleReading,
    /// Sensor not initialized
    NotInitialized,
}

impl AhrsError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            AhrsError::SensorError => "SensorError",
            AhrsError::StaleReading => "StaleReading",
            AhrsError::NotInitialized => "NotInitialized",
        }
    }
}

impl fmt::Display for AhrsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AhrsError::SensorError => write!(f, "IMU communication failed"),
            AhrsError::StaleReading => write!(f, "IMU reading is stale"),
            AhrsError::NotInitialized => write!(f, "IMU not initialized"),
        }
    }
}
