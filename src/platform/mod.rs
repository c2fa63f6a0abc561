//! Platform abstraction layer
//!
//! Hardware access for the robot goes through the traits in [`traits`].
//! Mock peripherals are available in tests and with the `mock` feature.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{PlatformError, Result};
pub use traits::{GpioInterface, GpioMode, PwmConfig, PwmInterface, TimerInterface};
