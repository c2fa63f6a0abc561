pub mod error;
pub mod platform;
pub mod robot;
pub mod runner;

pub use error::SimulatorError;
pub use platform::{MotorChannel, SitlPlatform, SitlTimeSource};
pub use robot::{RobotConfig, RobotState, SimEncoder, SimImu, SimRobot, Wheel};
pub use runner::{
    run_until, DriveMode, Pace, SimClock, SimConfig, SimControlLoop, SimReport, Simulation,
};
