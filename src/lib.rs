#![cfg_attr(not(test), no_std)]

//! slampibot - Attitude estimation and differential drive for a two-wheeled robot
//!
//! Pure math (filters, attitude, mixing, motor state machine, parameters)
//! lives in `slampibot_core`. This crate adds the platform layer, pin-level
//! device drivers and the rover control loop on top of it.

// Platform abstraction layer (PWM, GPIO, timer traits and mocks)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Logging macros, cancellation and safe stop
pub mod core;

// Rover control loop and drive plans
pub mod rover;
