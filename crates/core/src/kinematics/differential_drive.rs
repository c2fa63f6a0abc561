//! Differential drive kinematics for two-wheeled robots
//!
//! Converts a (linear, angular) velocity request into left/right wheel
//! commands. Each wheel saturates independently at ±1.0; values are
//! clamped, not rescaled, so turning at high linear speed can saturate one
//! wheel while the other still follows the request.
//!
//! # Examples
//!
//! ```
//! use slampibot_core::kinematics::{DifferentialDriveController, DriveRequest, WheelDirection};
//!
//! let controller = DifferentialDriveController::new();
//!
//! // Gentle right turn while driving forward
//! let (left, right) = controller.compute(DriveRequest::new(0.5, -0.1));
//! assert_eq!(left.direction, WheelDirection::Forward);
//! assert!((left.magnitude - 0.6).abs() < 1e-6);
//! assert!((right.magnitude - 0.4).abs() < 1e-6);
//!
//! // Right wheel saturates, left wheel does not
//! let (left, right) = controller.compute(DriveRequest::new(1.0, 0.5));
//! assert_eq!(left.magnitude, 0.5);
//! assert_eq!(right.magnitude, 1.0);
//! ```

/// Desired body motion, normalized to roughly [-1.0, +1.0]
///
/// The request itself is not clamped; saturation happens per wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveRequest {
    /// Forward velocity (positive = forward)
    pub linear_velocity: f32,
    /// Turn rate (positive = counter-clockwise, speeds up the right wheel)
    pub angular_velocity: f32,
}

impl DriveRequest {
    pub fn new(linear_velocity: f32, angular_velocity: f32) -> Self {
        Self {
            linear_velocity,
            angular_velocity,
        }
    }

    /// Zero-velocity request
    pub fn stop() -> Self {
        Self::default()
    }
}

/// Wheel rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Forward,
    Backward,
    Stop,
}

/// Command for one wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    /// Rotation direction
    pub direction: WheelDirection,
    /// Speed magnitude in [0.0, 1.0]
    pub magnitude: f32,
    /// Signed, clamped velocity the command was derived from
    pub velocity: f32,
}

impl WheelCommand {
    /// Build a command from a signed wheel velocity
    ///
    /// The velocity is clamped to [-1.0, +1.0]. Zero (and NaN) map to
    /// `Stop` with zero magnitude.
    pub fn from_velocity(velocity: f32) -> Self {
        let velocity = velocity.clamp(-1.0, 1.0);

        if velocity > 0.0 {
            Self {
                direction: WheelDirection::Forward,
                magnitude: velocity,
                velocity,
            }
        } else if velocity < 0.0 {
            Self {
                direction: WheelDirection::Backward,
                magnitude: -velocity,
                velocity,
            }
        } else {
            Self {
                direction: WheelDirection::Stop,
                magnitude: 0.0,
                velocity,
            }
        }
    }
}

/// Differential drive converter
///
/// Stateless: the same request always produces the same wheel pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialDriveController;

impl DifferentialDriveController {
    pub fn new() -> Self {
        Self
    }

    /// Convert linear/angular velocity to clamped (left, right) wheel speeds
    ///
    /// # Algorithm
    ///
    /// 1. `left = linear - angular`, `right = linear + angular`
    /// 2. Clamp each to [-1.0, +1.0] independently
    #[inline]
    pub fn mix(linear_velocity: f32, angular_velocity: f32) -> (f32, f32) {
        let left = linear_velocity - angular_velocity;
        let right = linear_velocity + angular_velocity;

        (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0))
    }

    /// Compute the (left, right) wheel commands for a request
    pub fn compute(&self, request: DriveRequest) -> (WheelCommand, WheelCommand) {
        let (left, right) = Self::mix(request.linear_velocity, request.angular_velocity);
        (
            WheelCommand::from_velocity(left),
            WheelCommand::from_velocity(right),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn compute(linear: f32, angular: f32) -> (WheelCommand, WheelCommand) {
        DifferentialDriveController::new().compute(DriveRequest::new(linear, angular))
    }

    #[test]
    fn test_forward_with_turn() {
        let (left, right) = compute(0.5, -0.1);

        assert_eq!(left.direction, WheelDirection::Forward);
        assert!((left.magnitude - 0.6).abs() < EPSILON);
        assert_eq!(right.direction, WheelDirection::Forward);
        assert!((right.magnitude - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_one_wheel_saturates() {
        let (left, right) = compute(1.0, 0.5);

        // left = 0.5 passes through, right = 1.5 clamps to 1.0
        assert_eq!(left.direction, WheelDirection::Forward);
        assert_eq!(left.magnitude, 0.5);
        assert_eq!(right.direction, WheelDirection::Forward);
        assert_eq!(right.magnitude, 1.0);
        assert_eq!(right.velocity, 1.0);
    }

    #[test]
    fn test_clamp_not_rescale() {
        let (left, right) = DifferentialDriveController::mix(0.9, 0.6);
        // Raw: left = 0.3, right = 1.5. Rescaling would give 0.2 / 1.0.
        assert!((left - 0.3).abs() < EPSILON);
        assert_eq!(right, 1.0);
    }

    #[test]
    fn test_straight_reverse() {
        let (left, right) = compute(-0.5, 0.0);
        assert_eq!(left.direction, WheelDirection::Backward);
        assert_eq!(left.magnitude, 0.5);
        assert_eq!(left.velocity, -0.5);
        assert_eq!(right, left);
    }

    #[test]
    fn test_spin_in_place() {
        let (left, right) = compute(0.0, 1.0);
        assert_eq!(left.direction, WheelDirection::Backward);
        assert_eq!(left.magnitude, 1.0);
        assert_eq!(right.direction, WheelDirection::Forward);
        assert_eq!(right.magnitude, 1.0);
    }

    #[test]
    fn test_reverse_saturation() {
        let (left, right) = compute(-1.0, 0.5);
        assert_eq!(left.velocity, -1.0);
        assert_eq!(left.magnitude, 1.0);
        assert_eq!(right.velocity, -0.5);
    }

    #[test]
    fn test_zero_request_stops() {
        let (left, right) = compute(0.0, 0.0);
        assert_eq!(left.direction, WheelDirection::Stop);
        assert_eq!(left.magnitude, 0.0);
        assert_eq!(right.direction, WheelDirection::Stop);
    }

    #[test]
    fn test_nan_stops() {
        let command = WheelCommand::from_velocity(f32::NAN);
        assert_eq!(command.direction, WheelDirection::Stop);
        assert_eq!(command.magnitude, 0.0);
    }

    #[test]
    fn test_repeated_compute_is_identical() {
        let controller = DifferentialDriveController::new();
        let request = DriveRequest::new(0.3, 0.45);
        let first = controller.compute(request);
        for _ in 0..10 {
            assert_eq!(controller.compute(request), first);
        }
    }

    // Property: magnitudes always in [0.0, 1.0], velocities in [-1.0, 1.0]
    #[test]
    fn test_output_range_property() {
        let test_values = [-2.0, -1.0, -0.5, -0.3, 0.0, 0.3, 0.5, 0.8, 1.0, 2.0];
        for &linear in &test_values {
            for &angular in &test_values {
                let (left, right) = compute(linear, angular);
                for wheel in [left, right] {
                    assert!(
                        (0.0..=1.0).contains(&wheel.magnitude),
                        "magnitude={} out of range for linear={}, angular={}",
                        wheel.magnitude,
                        linear,
                        angular
                    );
                    assert!((-1.0..=1.0).contains(&wheel.velocity));
                }
            }
        }
    }

    // Symmetry: negating angular swaps the wheels
    #[test]
    fn test_turn_symmetry() {
        let (left_pos, right_pos) = compute(0.4, 0.3);
        let (left_neg, right_neg) = compute(0.4, -0.3);
        assert_eq!(left_pos, right_neg);
        assert_eq!(right_pos, left_neg);
    }
}
