//! Device drivers
//!
//! Hardware-independent drivers written against the platform traits.
//!
//! ## Modules
//!
//! - `l298n`: L298N motor channel driven by PWM + GPIO
//! - `imu`: IMU source wrapper with stale-reading fallback
//! - `encoder`: Wheel encoder polling interface

pub mod encoder;
pub mod imu;
pub mod l298n;

pub use encoder::WheelEncoder;
#[cfg(any(test, feature = "mock"))]
pub use encoder::MockEncoder;
pub use imu::LastGoodImu;
pub use l298n::L298nMotor;
