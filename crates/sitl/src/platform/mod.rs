//! Simulated platform for SITL.
//!
//! `SitlPlatform` hands out simulated PWM and GPIO pins and keeps track of
//! which pin numbers are taken. A [`MotorChannel`] bundles the three pins
//! of one L298N channel; the motor driver writes through one set of
//! handles while the simulated robot reads the same pins through clones.

pub mod gpio;
pub mod pwm;
pub mod timer;

pub use gpio::SitlGpio;
pub use pwm::SitlPwm;
pub use timer::SitlTimeSource;

use std::sync::{Mutex, PoisonError};

use slampibot::devices::L298nMotor;
use slampibot::platform::{GpioInterface, PwmInterface};

use crate::error::SimulatorError;

/// Maximum GPIO pin number (RP2040).
const MAX_GPIO: u8 = 29;

/// Pin numbers of one L298N channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L298nPins {
    pub enable: u8,
    pub in1: u8,
    pub in2: u8,
}

/// Right wheel: ENA on GP2, IN1 on GP3, IN2 on GP4.
pub const RIGHT_MOTOR_PINS: L298nPins = L298nPins {
    enable: 2,
    in1: 3,
    in2: 4,
};

/// Left wheel: ENB on GP7, IN3 on GP6, IN4 on GP5.
pub const LEFT_MOTOR_PINS: L298nPins = L298nPins {
    enable: 7,
    in1: 6,
    in2: 5,
};

/// Pin-level L298N driver on simulated pins.
pub type SitlMotor = L298nMotor<SitlPwm, SitlGpio, SitlGpio>;

/// The three simulated pins of one L298N channel.
#[derive(Debug, Clone)]
pub struct MotorChannel {
    pub enable: SitlPwm,
    pub in1: SitlGpio,
    pub in2: SitlGpio,
}

impl MotorChannel {
    /// Build a driver writing to these pins.
    pub fn driver(&self, max_duty: u16) -> SitlMotor {
        L298nMotor::new(
            self.enable.clone(),
            self.in1.clone(),
            self.in2.clone(),
            max_duty,
        )
    }

    /// Signed drive fraction the H-bridge is applying, in [-1.0, 1.0].
    ///
    /// Both inputs low (or both high) lets the wheel run free, whatever
    /// the enable duty.
    pub fn drive(&self) -> f32 {
        let duty = self.enable.output();
        match (self.in1.read(), self.in2.read()) {
            (false, true) => duty,
            (true, false) => -duty,
            _ => 0.0,
        }
    }
}

/// Simulated platform providing peripheral access.
pub struct SitlPlatform {
    time_source: SitlTimeSource,
    allocated: Mutex<Vec<u8>>,
}

impl SitlPlatform {
    /// Create a new SITL platform with its own clock.
    pub fn new() -> Self {
        Self::with_time_source(SitlTimeSource::new())
    }

    /// Create a new SITL platform with a shared time source.
    pub fn with_time_source(time_source: SitlTimeSource) -> Self {
        Self {
            time_source,
            allocated: Mutex::new(Vec::new()),
        }
    }

    /// Get a reference to the time source.
    pub fn time_source(&self) -> &SitlTimeSource {
        &self.time_source
    }

    fn allocate(&self, pin: u8) -> Result<(), SimulatorError> {
        if pin > MAX_GPIO {
            return Err(SimulatorError::PinOutOfRange(pin));
        }
        let mut allocated = self
            .allocated
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if allocated.contains(&pin) {
            return Err(SimulatorError::PinInUse(pin));
        }
        allocated.push(pin);
        Ok(())
    }

    /// Create a simulated PWM channel.
    pub fn create_pwm(&self, pin: u8, frequency: u32) -> Result<SitlPwm, SimulatorError> {
        self.allocate(pin)?;
        Ok(SitlPwm::new(pin, frequency, 0.0))
    }

    /// Create a simulated GPIO output pin.
    pub fn create_gpio(&self, pin: u8) -> Result<SitlGpio, SimulatorError> {
        self.allocate(pin)?;
        Ok(SitlGpio::new_output(pin))
    }

    /// Allocate the three pins of an L298N channel.
    ///
    /// The enable pin starts disabled; [`L298nMotor::configure`] turns it on.
    pub fn create_motor_channel(
        &self,
        pins: L298nPins,
        frequency: u32,
    ) -> Result<MotorChannel, SimulatorError> {
        Ok(MotorChannel {
            enable: self.create_pwm(pins.enable, frequency)?,
            in1: self.create_gpio(pins.in1)?,
            in2: self.create_gpio(pins.in2)?,
        })
    }
}

impl Default for SitlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SitlPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SitlPlatform")
            .field("time_source", &self.time_source)
            .finish()
    }
}
