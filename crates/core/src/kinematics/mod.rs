//! Vehicle kinematics
//!
//! Conversion from body velocity requests to per-wheel commands.

pub mod differential_drive;

pub use differential_drive::{
    DifferentialDriveController, DriveRequest, WheelCommand, WheelDirection,
};
