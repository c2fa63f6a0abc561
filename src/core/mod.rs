//! Core runtime infrastructure
//!
//! Logging macros and the shutdown machinery shared by the control loop.

pub mod logging;
pub mod shutdown;

pub use shutdown::{SafeStop, ShutdownSignal};
