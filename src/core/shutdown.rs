//! Cooperative cancellation and guaranteed motor stop
//!
//! [`ShutdownSignal`] is an atomic flag polled by the control loop between
//! iterations. [`SafeStop`] is a scope guard around the motor pair: when it
//! goes out of scope (normal end, cancellation, an error returned with `?`
//! or a panic unwinding on host) both wheels are coasted with zero duty.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use slampibot_core::motor::{MotorDriver, MotorError, MotorPair};

/// Cancellation request flag
///
/// Can live in a `static` on the robot or behind an `Arc` on host.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    requested: AtomicBool,
}

impl ShutdownSignal {
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
        }
    }

    /// Ask the loop to stop after the current iteration
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Clear a previous request so the signal can be reused
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

/// Scope guard that coasts both motors on drop
pub struct SafeStop<'a, M: MotorDriver> {
    motors: &'a mut MotorPair<M>,
    armed: bool,
}

impl<'a, M: MotorDriver> SafeStop<'a, M> {
    pub fn new(motors: &'a mut MotorPair<M>) -> Self {
        Self {
            motors,
            armed: true,
        }
    }

    /// Coast now and report the result instead of only logging it
    ///
    /// The guard does nothing more on drop after this, even if coasting
    /// failed.
    pub fn finish(mut self) -> Result<(), MotorError> {
        self.armed = false;
        self.motors.coast_all()
    }
}

impl<M: MotorDriver> Deref for SafeStop<'_, M> {
    type Target = MotorPair<M>;

    fn deref(&self) -> &Self::Target {
        self.motors
    }
}

impl<M: MotorDriver> DerefMut for SafeStop<'_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.motors
    }
}

impl<M: MotorDriver> Drop for SafeStop<'_, M> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        crate::log_warn!("Safe stop: coasting motors");
        if let Err(e) = self.motors.coast_all() {
            crate::log_error!("Safe stop failed: {}", e.as_str());
        }
    }
}
