//! Rover vehicle implementation
//!
//! Two-wheeled differential-drive robot: attitude estimation plus motor
//! control in one owned, single-threaded loop.
//!
//! ## Modules
//!
//! - `control_loop`: [`ControlLoop`] owning estimator, mixer and motors
//! - `plan`: Drive plans feeding commands to the loop over time

pub mod control_loop;
pub mod plan;

pub use control_loop::{ControlLoop, LoopError, RunOutcome, RunSummary, StepReport};
pub use plan::{
    ConstantVelocity, DriveCommand, DrivePlan, PatternPhase, TestPattern, DEFAULT_PHASE_MS,
    PATTERN_ANGULAR, PATTERN_LINEAR,
};
