//! Platform abstraction traits
//!
//! The interfaces the motor driver and control loop need from a board.

pub mod gpio;
pub mod pwm;
pub mod timer;

pub use gpio::{GpioInterface, GpioMode};
pub use pwm::{PwmConfig, PwmInterface};
pub use timer::TimerInterface;
