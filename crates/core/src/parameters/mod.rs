//! Parameter management types
//!
//! Typed configuration with defaults equal to the robot's built-in
//! constants. Each parameter group registers its values in a
//! [`ParameterStore`], loads itself back with `from_store` and checks its
//! ranges with `validate`. [`RobotParams`] bundles the groups so that
//! `NAME=VALUE` overrides can be applied to all of them at once.

pub mod attitude;
pub mod calibration;
pub mod drive;
pub mod error;
pub mod robot;
pub mod storage;

pub use attitude::AttitudeParams;
pub use drive::DriveParams;
pub use error::ParameterError;
pub use robot::RobotParams;
pub use storage::{ParamFlags, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
