//! Simulation runner.
//!
//! Wires the simulated robot to the real control loop: pin-level L298N
//! drivers on simulated pins, and the IMU chain the robot uses
//! (`LastGoodImu<CalibratedImu<_>>`). The control loop's timer is a
//! [`SimClock`] whose delays advance simulated time and integrate the
//! robot's physics, optionally sleeping in real time.
//!
//! [`run_until`] runs a [`Simulation`] on a blocking task and raises the
//! loop's shutdown signal when a caller-supplied future resolves (Ctrl+C
//! in the binary).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use slampibot::core::ShutdownSignal;
use slampibot::devices::{LastGoodImu, WheelEncoder};
use slampibot::platform::{Result as PlatformResult, TimerInterface};
use slampibot::rover::{
    ConstantVelocity, ControlLoop, RunSummary, StepReport, TestPattern, DEFAULT_PHASE_MS,
    PATTERN_ANGULAR, PATTERN_LINEAR,
};
use slampibot_core::ahrs::{AttitudeSample, CalibratedImu, CalibrationData};
use slampibot_core::kinematics::DriveRequest;
use slampibot_core::motor::{MotorPair, MotorState};
use slampibot_core::parameters::{AttitudeParams, DriveParams, ParameterStore, RobotParams};
use slampibot_core::traits::TimeSource;

use crate::error::SimulatorError;
use crate::platform::{
    SitlMotor, SitlPlatform, SitlTimeSource, LEFT_MOTOR_PINS, RIGHT_MOTOR_PINS,
};
use crate::robot::{RobotConfig, RobotState, SimImu, SimRobot, Wheel};

/// IMU chain used by the simulated robot.
pub type SimImuChain = LastGoodImu<CalibratedImu<SimImu>>;

/// Control loop on simulated hardware.
pub type SimControlLoop = ControlLoop<SimImuChain, SitlMotor>;

/// What to drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveMode {
    /// Hold one request, until cancelled or for `duration_ms`.
    Velocity {
        request: DriveRequest,
        duration_ms: Option<u64>,
    },
    /// Bench test pattern: forward, backward, stop, each `phase_ms` long.
    Pattern {
        request: DriveRequest,
        phase_ms: u64,
        cycles: Option<u32>,
    },
}

impl DriveMode {
    /// Bench test pattern with its usual speeds and timing.
    pub fn bench_pattern() -> Self {
        DriveMode::Pattern {
            request: DriveRequest::new(PATTERN_LINEAR, PATTERN_ANGULAR),
            phase_ms: DEFAULT_PHASE_MS,
            cycles: None,
        }
    }

    fn request(&self) -> DriveRequest {
        match *self {
            DriveMode::Velocity { request, .. } | DriveMode::Pattern { request, .. } => request,
        }
    }
}

/// How simulated time relates to wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Every delay also sleeps for the same wall time.
    RealTime,
    /// Run as fast as possible.
    Lockstep,
}

/// Full simulation setup.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub mode: DriveMode,
    pub pace: Pace,
    pub robot: RobotConfig,
    pub attitude: AttitudeParams,
    pub drive: DriveParams,
    /// Calibration the control side applies to raw IMU readings.
    pub calibration: CalibrationData,
    /// Print the attitude every N iterations; 0 disables.
    pub print_every: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: DriveMode::bench_pattern(),
            pace: Pace::RealTime,
            robot: RobotConfig::default(),
            attitude: AttitudeParams::default(),
            drive: DriveParams::default(),
            calibration: CalibrationData::reference_board(),
            print_every: 0,
        }
    }
}

impl SimConfig {
    /// Reject drive requests the mixer cannot use.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        let request = self.mode.request();
        if !request.linear_velocity.is_finite() || !request.angular_velocity.is_finite() {
            return Err(SimulatorError::InvalidArgument(format!(
                "drive request must be finite, got ({}, {})",
                request.linear_velocity, request.angular_velocity
            )));
        }
        if let DriveMode::Pattern { phase_ms: 0, .. } = self.mode {
            return Err(SimulatorError::InvalidArgument(
                "pattern phase must be at least 1 ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Attitude, drive and calibration parameters of this config
    pub fn params(&self) -> RobotParams {
        RobotParams {
            attitude: self.attitude,
            drive: self.drive,
            calibration: self.calibration,
        }
    }

    /// Parameter store seeded with this config's values
    pub fn parameter_store(&self) -> Result<ParameterStore, SimulatorError> {
        Ok(self.params().to_store()?)
    }

    /// Apply `NAME=VALUE` overrides
    ///
    /// Overrides are parsed into a store seeded with the current values and
    /// every group is validated before any of them is replaced, so a
    /// rejected override leaves the config untouched.
    pub fn apply_params<'a, I>(&mut self, overrides: I) -> Result<(), SimulatorError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut store = self.parameter_store()?;
        for assignment in overrides {
            let (name, value) = assignment.split_once('=').ok_or_else(|| {
                SimulatorError::InvalidArgument(format!(
                    "expected NAME=VALUE, got '{assignment}'"
                ))
            })?;
            let name = name.trim();
            store.set_from_str(name, value).map_err(|e| {
                SimulatorError::InvalidArgument(format!("{name}={value}: {e}"))
            })?;
        }

        let params = RobotParams::from_store(&store)?;
        self.attitude = params.attitude;
        self.drive = params.drive;
        self.calibration = params.calibration;
        Ok(())
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimReport {
    pub summary: RunSummary,
    /// Attitude from the last iteration.
    pub attitude: Option<AttitudeSample>,
    /// Final simulated pose.
    pub robot: RobotState,
    /// (left, right) encoder positions.
    pub encoders: (i32, i32),
    /// (left, right) motor states.
    pub motors: (Option<MotorState>, Option<MotorState>),
    /// Simulated time elapsed in milliseconds.
    pub sim_time_ms: u64,
}

/// Timer for the control loop that moves the simulated world.
pub struct SimClock {
    time: SitlTimeSource,
    robot: SimRobot,
    pace: Pace,
}

impl SimClock {
    pub fn new(time: SitlTimeSource, robot: SimRobot, pace: Pace) -> Self {
        Self { time, robot, pace }
    }

    pub fn robot(&self) -> &SimRobot {
        &self.robot
    }
}

impl TimeSource for SimClock {
    fn now_us(&self) -> u64 {
        self.time.now_us()
    }
}

impl TimerInterface for SimClock {
    fn delay_us(&mut self, us: u32) -> PlatformResult<()> {
        if self.pace == Pace::RealTime {
            std::thread::sleep(Duration::from_micros(us as u64));
        }
        self.time.advance_us(us as u64);
        self.robot.step(us as f32 / 1_000_000.0);
        Ok(())
    }
}

/// Simulated robot plus the control loop driving it.
pub struct Simulation {
    control: SimControlLoop,
    clock: SimClock,
    mode: DriveMode,
    print_every: u32,
}

impl Simulation {
    /// Allocate pins, configure both motor channels and capture the
    /// startup attitude bias.
    pub fn new(config: SimConfig) -> Result<Self, SimulatorError> {
        config.validate()?;

        let platform = SitlPlatform::new();
        let left = platform.create_motor_channel(LEFT_MOTOR_PINS, config.drive.pwm_freq_hz)?;
        let right = platform.create_motor_channel(RIGHT_MOTOR_PINS, config.drive.pwm_freq_hz)?;

        let mut left_motor = left.driver(config.drive.max_duty);
        let mut right_motor = right.driver(config.drive.max_duty);
        left_motor.configure(config.drive.pwm_freq_hz)?;
        right_motor.configure(config.drive.pwm_freq_hz)?;

        let robot = SimRobot::new(config.robot, left, right);
        let imu = LastGoodImu::new(CalibratedImu::new(robot.imu(), config.calibration));

        let control = ControlLoop::new(
            imu,
            MotorPair::new(left_motor, right_motor),
            &config.attitude,
            &config.drive,
        )?;

        Ok(Self {
            control,
            clock: SimClock::new(platform.time_source().clone(), robot, config.pace),
            mode: config.mode,
            print_every: config.print_every,
        })
    }

    pub fn robot(&self) -> &SimRobot {
        self.clock.robot()
    }

    pub fn control(&self) -> &SimControlLoop {
        &self.control
    }

    /// Run the configured drive mode until it completes or `shutdown` is raised.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<SimReport, SimulatorError> {
        let print_every = self.print_every;
        let mut printed = 0u32;
        let mut on_step = |report: &StepReport| {
            printed = printed.wrapping_add(1);
            if print_every > 0 && printed % print_every == 0 {
                println!("{}", report.attitude);
            }
        };

        let summary = match self.mode {
            DriveMode::Velocity {
                request,
                duration_ms,
            } => {
                let mut plan = match duration_ms {
                    Some(ms) => ConstantVelocity::for_duration(request, ms),
                    None => ConstantVelocity::new(request),
                };
                self.control
                    .run_with(&mut self.clock, shutdown, &mut plan, &mut on_step)?
            }
            DriveMode::Pattern {
                request,
                phase_ms,
                cycles,
            } => {
                let mut plan = TestPattern::new(request, phase_ms);
                if let Some(cycles) = cycles {
                    plan = plan.with_cycles(cycles);
                }
                self.control
                    .run_with(&mut self.clock, shutdown, &mut plan, &mut on_step)?
            }
        };

        Ok(self.report(summary))
    }

    fn report(&self, summary: RunSummary) -> SimReport {
        let robot = self.robot();
        SimReport {
            summary,
            attitude: self.control.attitude(),
            robot: robot.state(),
            encoders: (
                robot.encoder(Wheel::Left).position(),
                robot.encoder(Wheel::Right).position(),
            ),
            motors: self.control.motors().states(),
            sim_time_ms: self.clock.now_ms(),
        }
    }
}

/// Run a simulation on a blocking task until it completes or `stop` resolves.
///
/// When `stop` resolves first the loop is cancelled cooperatively and the
/// report of the cancelled run is returned.
pub async fn run_until<F>(config: SimConfig, stop: F) -> Result<SimReport, SimulatorError>
where
    F: Future<Output = ()>,
{
    let shutdown = Arc::new(ShutdownSignal::new());
    let worker_shutdown = Arc::clone(&shutdown);

    let mut handle = tokio::task::spawn_blocking(move || {
        let mut simulation = Simulation::new(config)?;
        simulation.run(&worker_shutdown)
    });

    tokio::pin!(stop);

    tokio::select! {
        result = &mut handle => return result?,
        _ = &mut stop => {
            shutdown.request();
        }
    }

    handle.await?
}
