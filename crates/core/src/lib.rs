//! slampibot_core - Pure no_std attitude and drive logic for slampibot
//!
//! Platform-agnostic algorithms and types for a two-wheeled robot with an
//! MPU9250 IMU and an L298N motor driver. Everything here is testable on
//! host without feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Sensors, motors and time are injected via traits
//!
//! # Modules
//!
//! - [`filter`]: Single-pole low-pass filter
//! - [`ahrs`]: Tilt + compass attitude estimation, calibration, heading
//! - [`kinematics`]: Differential drive velocity mixing
//! - [`motor`]: L298N motor state machine and motor pair
//! - [`parameters`]: Typed configuration with defaults and validation
//! - [`traits`]: Time source abstraction

#![no_std]

pub mod ahrs;
pub mod filter;
pub mod kinematics;
pub mod motor;
pub mod parameters;
pub mod traits;
