//! Motor driver abstraction
//!
//! Models one channel of an L298N dual H-bridge: a PWM enable pin that sets
//! speed and two direction inputs (IN1, IN2) that select rotation.
//!
//! # L298N Truth Table (as driven here)
//!
//! | IN1 | IN2 | ENA        | Motor State |
//! |-----|-----|------------|-------------|
//! | 0   | 1   | duty       | Forward     |
//! | 1   | 0   | duty       | Backward    |
//! | 0   | 0   | duty       | Coast       |
//!
//! # Stop duty
//!
//! [`MotorDriver::stop`] keeps writing the duty derived from the speed it
//! is given, signed, while both direction inputs go low. Callers that want
//! the enable pin low as well use [`MotorDriver::coast`].
//!
//! This module is pure `no_std`. Pin-level drivers implementing
//! [`MotorDriver`] live in the platform crate.

use core::fmt;

use libm::{fabsf, roundf};

use crate::kinematics::{WheelCommand, WheelDirection};

/// Full-scale 16-bit enable duty word
pub const FULL_SCALE_DUTY: u16 = u16::MAX;

/// Motor control error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// PWM or GPIO write failed
    HardwareFault,
}

impl MotorError {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorError::HardwareFault => "motor hardware fault",
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a normalized speed to an enable duty word
///
/// `round(speed * max_duty)`, saturated into `[0, max_duty]`. Negative
/// speeds and NaN give 0.
#[inline]
pub fn duty_word(speed: f32, max_duty: u16) -> u16 {
    let word = roundf(speed * max_duty as f32);
    // float-to-int `as` saturates and maps NaN to 0
    (word as u16).min(max_duty)
}

/// Pin-level image of a motor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOutputs {
    /// Enable pin duty word
    pub enable_duty: u16,
    /// IN1 level
    pub in1: bool,
    /// IN2 level
    pub in2: bool,
}

impl DriverOutputs {
    /// Enable duty as a fraction of the full-scale word
    pub fn enable_fraction(&self) -> f32 {
        self.enable_duty as f32 / FULL_SCALE_DUTY as f32
    }
}

/// Motor driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Forward { duty: u16 },
    Backward { duty: u16 },
    Coast { duty: u16 },
}

impl MotorState {
    /// Forward state for `speed`, clamped to [-1.0, +1.0]
    ///
    /// The duty uses the signed speed, so a negative argument yields a
    /// zero duty rather than reversing.
    pub fn forward(speed: f32, max_duty: u16) -> Self {
        MotorState::Forward {
            duty: duty_word(clamp_speed(speed), max_duty),
        }
    }

    /// Backward state; duty from `|speed|`
    pub fn backward(speed: f32, max_duty: u16) -> Self {
        MotorState::Backward {
            duty: duty_word(fabsf(clamp_speed(speed)), max_duty),
        }
    }

    /// Coast state keeping the duty of the signed `speed`
    pub fn stop(speed: f32, max_duty: u16) -> Self {
        MotorState::Coast {
            duty: duty_word(clamp_speed(speed), max_duty),
        }
    }

    /// Coast with the enable pin low
    pub const fn coast() -> Self {
        MotorState::Coast { duty: 0 }
    }

    pub fn duty(&self) -> u16 {
        match *self {
            MotorState::Forward { duty }
            | MotorState::Backward { duty }
            | MotorState::Coast { duty } => duty,
        }
    }

    pub fn is_coast(&self) -> bool {
        matches!(self, MotorState::Coast { .. })
    }

    /// Enable duty and direction pin levels for this state
    pub fn outputs(&self) -> DriverOutputs {
        let (in1, in2) = match self {
            MotorState::Forward { .. } => (false, true),
            MotorState::Backward { .. } => (true, false),
            MotorState::Coast { .. } => (false, false),
        };
        DriverOutputs {
            enable_duty: self.duty(),
            in1,
            in2,
        }
    }
}

#[inline]
fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(-1.0, 1.0)
}

/// Per-wheel motor driver
///
/// A driver has no state until its first command; [`MotorDriver::state`]
/// returns `None` until then.
pub trait MotorDriver {
    /// Drive forward at `speed` in [0.0, 1.0]
    fn forward(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Drive backward at `|speed|`
    fn backward(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Release both direction inputs, keeping the duty of the signed `speed`
    fn stop(&mut self, speed: f32) -> Result<(), MotorError>;

    /// Last commanded state
    fn state(&self) -> Option<MotorState>;

    /// Execute a wheel command
    ///
    /// Forward and Backward use the command magnitude; Stop passes the
    /// signed velocity to [`MotorDriver::stop`].
    fn apply(&mut self, command: &WheelCommand) -> Result<(), MotorError> {
        match command.direction {
            WheelDirection::Forward => self.forward(command.magnitude),
            WheelDirection::Backward => self.backward(command.magnitude),
            WheelDirection::Stop => self.stop(command.velocity),
        }
    }

    /// Coast with zero duty
    fn coast(&mut self) -> Result<(), MotorError> {
        self.stop(0.0)
    }
}

impl<T: MotorDriver + ?Sized> MotorDriver for &mut T {
    fn forward(&mut self, speed: f32) -> Result<(), MotorError> {
        (**self).forward(speed)
    }

    fn backward(&mut self, speed: f32) -> Result<(), MotorError> {
        (**self).backward(speed)
    }

    fn stop(&mut self, speed: f32) -> Result<(), MotorError> {
        (**self).stop(speed)
    }

    fn state(&self) -> Option<MotorState> {
        (**self).state()
    }
}

/// Hardware-free L298N channel
///
/// Tracks the state machine only. Used for simulation and as the reference
/// behavior for pin-level drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L298n {
    max_duty: u16,
    state: Option<MotorState>,
}

impl L298n {
    pub fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            state: None,
        }
    }

    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Current pin image, `None` before the first command
    pub fn outputs(&self) -> Option<DriverOutputs> {
        self.state.map(|state| state.outputs())
    }
}

impl Default for L298n {
    fn default() -> Self {
        Self::new(FULL_SCALE_DUTY)
    }
}

impl MotorDriver for L298n {
    fn forward(&mut self, speed: f32) -> Result<(), MotorError> {
        self.state = Some(MotorState::forward(speed, self.max_duty));
        Ok(())
    }

    fn backward(&mut self, speed: f32) -> Result<(), MotorError> {
        self.state = Some(MotorState::backward(speed, self.max_duty));
        Ok(())
    }

    fn stop(&mut self, speed: f32) -> Result<(), MotorError> {
        self.state = Some(MotorState::stop(speed, self.max_duty));
        Ok(())
    }

    fn state(&self) -> Option<MotorState> {
        self.state
    }
}

/// Left/right motor pair for differential drive
pub struct MotorPair<M: MotorDriver> {
    left: M,
    right: M,
}

impl<M: MotorDriver> MotorPair<M> {
    pub fn new(left: M, right: M) -> Self {
        Self { left, right }
    }

    /// Apply a (left, right) command pair
    ///
    /// Stops at the first failing wheel.
    #[inline]
    pub fn apply(&mut self, commands: &(WheelCommand, WheelCommand)) -> Result<(), MotorError> {
        self.left.apply(&commands.0)?;
        self.right.apply(&commands.1)?;
        Ok(())
    }

    /// Coast both wheels with zero duty
    ///
    /// Both wheels are always attempted; the first error is returned.
    pub fn coast_all(&mut self) -> Result<(), MotorError> {
        let left = self.left.coast();
        let right = self.right.coast();
        left.and(right)
    }

    pub fn left(&self) -> &M {
        &self.left
    }

    pub fn right(&self) -> &M {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut M {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut M {
        &mut self.right
    }

    /// (left, right) states
    pub fn states(&self) -> (Option<MotorState>, Option<MotorState>) {
        (self.left.state(), self.right.state())
    }
}
