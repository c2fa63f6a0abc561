//! Mock platform implementation for testing
//!
//! Available during test builds and with the `mock` feature.

#![cfg(any(test, feature = "mock"))]

mod gpio;
mod pwm;
mod timer;

pub use gpio::MockGpio;
pub use pwm::MockPwm;
pub use timer::MockTimer;
