//! Drive plans
//!
//! A plan tells the control loop what to command at a given time since
//! the run started. Two plans exist:
//!
//! - [`ConstantVelocity`]: hold one (linear, angular) request
//! - [`TestPattern`]: the bench test cycle of forward, backward and stop
//!   phases with the same wheel speeds, each phase `phase_ms` long
//!
//! The test pattern drives each wheel through `forward(v)`, `backward(v)`
//! and `stop(v)` directly with the mixed wheel speed `v`, so the stop
//! phase keeps the duty of `v` on the enable pin.

use slampibot_core::kinematics::DriveRequest;

/// Default phase length of the bench test pattern
pub const DEFAULT_PHASE_MS: u64 = 3000;

/// Wheel speeds used by the bench test pattern
pub const PATTERN_LINEAR: f32 = 0.5;
pub const PATTERN_ANGULAR: f32 = -0.1;

/// Phase of the bench test pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPhase {
    Forward,
    Backward,
    Stop,
}

impl PatternPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternPhase::Forward => "forward",
            PatternPhase::Backward => "backward",
            PatternPhase::Stop => "stop",
        }
    }
}

/// What the loop should do this iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    /// Mix the request and apply the resulting wheel commands
    Velocity(DriveRequest),
    /// Mix the request and drive both wheels in `phase`
    Pattern {
        phase: PatternPhase,
        request: DriveRequest,
    },
}

/// Source of drive commands over time
pub trait DrivePlan {
    /// Command for `elapsed_ms` since the run started, `None` once done
    fn command(&mut self, elapsed_ms: u64) -> Option<DriveCommand>;
}

impl<T: DrivePlan + ?Sized> DrivePlan for &mut T {
    fn command(&mut self, elapsed_ms: u64) -> Option<DriveCommand> {
        (**self).command(elapsed_ms)
    }
}

/// Hold one request, optionally for a limited time
#[derive(Debug, Clone, Copy)]
pub struct ConstantVelocity {
    request: DriveRequest,
    duration_ms: Option<u64>,
}

impl ConstantVelocity {
    /// Run until cancelled
    pub fn new(request: DriveRequest) -> Self {
        Self {
            request,
            duration_ms: None,
        }
    }

    /// Run for `duration_ms`, then complete
    pub fn for_duration(request: DriveRequest, duration_ms: u64) -> Self {
        Self {
            request,
            duration_ms: Some(duration_ms),
        }
    }
}

impl DrivePlan for ConstantVelocity {
    fn command(&mut self, elapsed_ms: u64) -> Option<DriveCommand> {
        match self.duration_ms {
            Some(limit) if elapsed_ms >= limit => None,
            _ => Some(DriveCommand::Velocity(self.request)),
        }
    }
}

/// Bench test cycle: forward, backward, stop, repeat
#[derive(Debug, Clone, Copy)]
pub struct TestPattern {
    request: DriveRequest,
    phase_ms: u64,
    cycles: Option<u32>,
}

impl TestPattern {
    /// Endless pattern with `request` and `phase_ms` per phase
    ///
    /// A zero phase length is raised to 1 ms.
    pub fn new(request: DriveRequest, phase_ms: u64) -> Self {
        Self {
            request,
            phase_ms: phase_ms.max(1),
            cycles: None,
        }
    }

    /// Stop after `cycles` full forward/backward/stop cycles
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = Some(cycles);
        self
    }

    pub fn phase_ms(&self) -> u64 {
        self.phase_ms
    }

    /// Phase active at `elapsed_ms`, ignoring the cycle limit
    pub fn phase_at(&self, elapsed_ms: u64) -> PatternPhase {
        match (elapsed_ms / self.phase_ms) % 3 {
            0 => PatternPhase::Forward,
            1 => PatternPhase::Backward,
            _ => PatternPhase::Stop,
        }
    }
}

impl Default for TestPattern {
    fn default() -> Self {
        Self::new(
            DriveRequest::new(PATTERN_LINEAR, PATTERN_ANGULAR),
            DEFAULT_PHASE_MS,
        )
    }
}

impl DrivePlan for TestPattern {
    fn command(&mut self, elapsed_ms: u64) -> Option<DriveCommand> {
        if let Some(cycles) = self.cycles {
            let cycle = elapsed_ms / self.phase_ms.saturating_mul(3);
            if cycle >= cycles as u64 {
                return None;
            }
        }
        Some(DriveCommand::Pattern {
            phase: self.phase_at(elapsed_ms),
            request: self.request,
        })
    }
}
