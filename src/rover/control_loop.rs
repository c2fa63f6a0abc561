//! Rover control loop
//!
//! Owns the attitude estimator, the drive mixer and both motors, and runs
//! the single-threaded cycle:
//!
//! 1. read the IMU and update the attitude estimate
//! 2. turn the plan's command into wheel outputs
//! 3. write the motors
//! 4. sleep for the loop period
//!
//! Cancellation is cooperative through [`ShutdownSignal`], checked before
//! every iteration. Every exit path of [`ControlLoop::run`] leaves both
//! motors coasting with zero duty: normal completion and cancellation via
//! [`SafeStop::finish`], errors via the guard's `Drop`.

use core::fmt;

use slampibot_core::ahrs::{AhrsError, AttitudeEstimator, AttitudeSample, ImuSource};
use slampibot_core::kinematics::DifferentialDriveController;
use slampibot_core::motor::{MotorDriver, MotorError, MotorPair};
use slampibot_core::parameters::{AttitudeParams, DriveParams, ParameterError};

use super::plan::{DriveCommand, DrivePlan, PatternPhase};
use crate::core::{SafeStop, ShutdownSignal};
use crate::platform::{PlatformError, TimerInterface};

/// Control loop failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopError {
    /// IMU read failed
    Sensor(AhrsError),
    /// Motor write failed
    Motor(MotorError),
    /// Timer or other platform failure
    Platform(PlatformError),
    /// Parameters rejected at construction
    Config(ParameterError),
}

impl LoopError {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopError::Sensor(e) => e.as_str(),
            LoopError::Motor(e) => e.as_str(),
            LoopError::Platform(_) => "platform error",
            LoopError::Config(e) => e.as_str(),
        }
    }
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Sensor(e) => write!(f, "sensor: {}", e),
            LoopError::Motor(e) => write!(f, "motor: {}", e),
            LoopError::Platform(e) => write!(f, "platform: {}", e),
            LoopError::Config(e) => write!(f, "config: {}", e),
        }
    }
}

impl From<AhrsError> for LoopError {
    fn from(e: AhrsError) -> Self {
        LoopError::Sensor(e)
    }
}

impl From<MotorError> for LoopError {
    fn from(e: MotorError) -> Self {
        LoopError::Motor(e)
    }
}

impl From<PlatformError> for LoopError {
    fn from(e: PlatformError) -> Self {
        LoopError::Platform(e)
    }
}

impl From<ParameterError> for LoopError {
    fn from(e: ParameterError) -> Self {
        LoopError::Config(e)
    }
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub attitude: AttitudeSample,
    /// Clamped (left, right) wheel velocities that were commanded
    pub wheel_velocities: (f32, f32),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The plan returned no further command
    Completed,
    /// The shutdown signal was raised
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    /// Iterations executed during this run
    pub iterations: u32,
}

/// Owned control loop state
pub struct ControlLoop<S: ImuSource, M: MotorDriver> {
    estimator: AttitudeEstimator<S>,
    controller: DifferentialDriveController,
    motors: MotorPair<M>,
    period_ms: u32,
    iterations: u32,
    last_attitude: Option<AttitudeSample>,
}

impl<S: ImuSource, M: MotorDriver> ControlLoop<S, M> {
    /// Validate parameters and capture the startup attitude bias
    ///
    /// # Errors
    ///
    /// `Config` if either parameter set is invalid, `Sensor` if the bias
    /// reading fails.
    pub fn new(
        source: S,
        motors: MotorPair<M>,
        attitude: &AttitudeParams,
        drive: &DriveParams,
    ) -> Result<Self, LoopError> {
        attitude.validate()?;
        drive.validate()?;

        let estimator = AttitudeEstimator::with_params(source, attitude)?;
        crate::log_info!(
            "Control loop ready: period {} ms, bias pitch {} roll {}",
            drive.loop_period_ms,
            estimator.pitch_bias(),
            estimator.roll_bias()
        );

        Ok(Self {
            estimator,
            controller: DifferentialDriveController::new(),
            motors,
            period_ms: drive.loop_period_ms,
            iterations: 0,
            last_attitude: None,
        })
    }

    /// Run one iteration without pacing or a safe stop
    pub fn step(&mut self, command: DriveCommand) -> Result<StepReport, LoopError> {
        let report = execute(
            &mut self.estimator,
            &self.controller,
            &mut self.motors,
            command,
        )?;
        self.iterations = self.iterations.wrapping_add(1);
        self.last_attitude = Some(report.attitude);
        Ok(report)
    }

    /// Run `plan` until it completes, `shutdown` is raised or a step fails
    ///
    /// Both motors coast with zero duty on every exit path.
    pub fn run<T, P>(
        &mut self,
        timer: &mut T,
        shutdown: &ShutdownSignal,
        plan: &mut P,
    ) -> Result<RunSummary, LoopError>
    where
        T: TimerInterface,
        P: DrivePlan,
    {
        self.run_with(timer, shutdown, plan, |_| {})
    }

    /// [`run`](Self::run), calling `on_step` after every successful iteration
    pub fn run_with<T, P, F>(
        &mut self,
        timer: &mut T,
        shutdown: &ShutdownSignal,
        plan: &mut P,
        mut on_step: F,
    ) -> Result<RunSummary, LoopError>
    where
        T: TimerInterface,
        P: DrivePlan,
        F: FnMut(&StepReport),
    {
        let Self {
            estimator,
            controller,
            motors,
            period_ms,
            iterations,
            last_attitude,
        } = self;

        let start_us = timer.now_us();
        let mut ran = 0u32;
        let mut motors = SafeStop::new(motors);

        let outcome = loop {
            if shutdown.is_requested() {
                crate::log_info!("Shutdown requested after {} iterations", ran);
                break RunOutcome::Cancelled;
            }

            let elapsed_ms = timer.elapsed_since(start_us) / 1000;
            let Some(command) = plan.command(elapsed_ms) else {
                break RunOutcome::Completed;
            };

            let report = execute(estimator, controller, &mut *motors, command)?;
            *last_attitude = Some(report.attitude);
            *iterations = iterations.wrapping_add(1);
            ran += 1;
            on_step(&report);

            timer.delay_ms(*period_ms)?;
        };

        motors.finish()?;
        crate::log_info!("Control loop stopped after {} iterations", ran);

        Ok(RunSummary {
            outcome,
            iterations: ran,
        })
    }

    /// Total iterations since construction
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Attitude from the most recent iteration
    pub fn attitude(&self) -> Option<AttitudeSample> {
        self.last_attitude
    }

    pub fn estimator(&self) -> &AttitudeEstimator<S> {
        &self.estimator
    }

    pub fn imu_mut(&mut self) -> &mut S {
        self.estimator.source_mut()
    }

    pub fn motors(&self) -> &MotorPair<M> {
        &self.motors
    }

    pub fn motors_mut(&mut self) -> &mut MotorPair<M> {
        &mut self.motors
    }
}

fn execute<S: ImuSource, M: MotorDriver>(
    estimator: &mut AttitudeEstimator<S>,
    controller: &DifferentialDriveController,
    motors: &mut MotorPair<M>,
    command: DriveCommand,
) -> Result<StepReport, LoopError> {
    let attitude = estimator.sample()?;

    let wheel_velocities = match command {
        DriveCommand::Velocity(request) => {
            let commands = controller.compute(request);
            motors.apply(&commands)?;
            (commands.0.velocity, commands.1.velocity)
        }
        DriveCommand::Pattern { phase, request } => {
            let (left, right) =
                DifferentialDriveController::mix(request.linear_velocity, request.angular_velocity);
            match phase {
                PatternPhase::Forward => {
                    motors.left_mut().forward(left)?;
                    motors.right_mut().forward(right)?;
                }
                PatternPhase::Backward => {
                    motors.left_mut().backward(left)?;
                    motors.right_mut().backward(right)?;
                }
                PatternPhase::Stop => {
                    motors.left_mut().stop(left)?;
                    motors.right_mut().stop(right)?;
                }
            }
            (left, right)
        }
    };

    Ok(StepReport {
        attitude,
        wheel_velocities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::LastGoodImu;
    use crate::platform::mock::MockTimer;
    use crate::rover::plan::{ConstantVelocity, TestPattern};
    use nalgebra::Vector3;
    use slampibot_core::ahrs::MockImu;
    use slampibot_core::kinematics::DriveRequest;
    use slampibot_core::motor::{L298n, MotorState};
    use slampibot_core::traits::TimeSource;

    const COAST: Option<MotorState> = Some(MotorState::Coast { duty: 0 });

    fn pair() -> MotorPair<L298n> {
        MotorPair::new(L298n::default(), L298n::default())
    }

    fn control_loop<S: ImuSource>(source: S) -> ControlLoop<S, L298n> {
        ControlLoop::new(
            source,
            pair(),
            &AttitudeParams::default(),
            &DriveParams::default(),
        )
        .unwrap()
    }

    // Succeeds for `good_reads` accelerometer reads, then fails
    struct FailingImu {
        inner: MockImu,
        good_reads: u32,
    }

    impl ImuSource for FailingImu {
        fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
            if self.good_reads == 0 {
                return Err(AhrsError::SensorError);
            }
            self.good_reads -= 1;
            self.inner.read_accel()
        }

        fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
            self.inner.read_mag()
        }
    }

    // Forward always fails; stop works
    #[derive(Default)]
    struct JammedMotor {
        inner: L298n,
    }

    impl MotorDriver for JammedMotor {
        fn forward(&mut self, _speed: f32) -> Result<(), MotorError> {
            Err(MotorError::HardwareFault)
        }

        fn backward(&mut self, speed: f32) -> Result<(), MotorError> {
            self.inner.backward(speed)
        }

        fn stop(&mut self, speed: f32) -> Result<(), MotorError> {
            self.inner.stop(speed)
        }

        fn state(&self) -> Option<MotorState> {
            self.inner.state()
        }
    }

    // Raises the signal once `after` commands have been handed out
    struct CancelAfter<'a> {
        signal: &'a ShutdownSignal,
        after: u32,
        issued: u32,
    }

    impl DrivePlan for CancelAfter<'_> {
        fn command(&mut self, _elapsed_ms: u64) -> Option<DriveCommand> {
            self.issued += 1;
            if self.issued >= self.after {
                self.signal.request();
            }
            Some(DriveCommand::Velocity(DriveRequest::new(0.5, -0.1)))
        }
    }

    #[test]
    fn test_new_captures_bias() {
        let tilted = MockImu::new(Vector3::new(0.2, 0.7, 0.3), Vector3::new(1.0, 0.0, 0.0));
        let mut rover = control_loop(tilted);
        assert!(rover.estimator().pitch_bias() != 0.0);

        let report = rover
            .step(DriveCommand::Velocity(DriveRequest::stop()))
            .unwrap();
        assert!(report.attitude.pitch.abs() < 1e-4);
        assert!(report.attitude.roll.abs() < 1e-4);
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        let drive = DriveParams {
            loop_period_ms: 0,
            ..DriveParams::default()
        };
        let result = ControlLoop::new(MockImu::level(), pair(), &AttitudeParams::default(), &drive);
        assert!(matches!(result, Err(LoopError::Config(_))));
    }

    #[test]
    fn test_new_propagates_bias_read_failure() {
        let mut imu = MockImu::level();
        imu.set_failure(Some(AhrsError::NotInitialized));
        let result = ControlLoop::new(
            imu,
            pair(),
            &AttitudeParams::default(),
            &DriveParams::default(),
        );
        assert!(matches!(
            result,
            Err(LoopError::Sensor(AhrsError::NotInitialized))
        ));
    }

    #[test]
    fn test_velocity_step_drives_wheels() {
        let mut rover = control_loop(MockImu::level());
        let report = rover
            .step(DriveCommand::Velocity(DriveRequest::new(0.5, -0.1)))
            .unwrap();

        assert!((report.wheel_velocities.0 - 0.6).abs() < 1e-6);
        assert!((report.wheel_velocities.1 - 0.4).abs() < 1e-6);
        assert_eq!(
            rover.motors().states(),
            (
                Some(MotorState::Forward { duty: 39321 }),
                Some(MotorState::Forward { duty: 26214 })
            )
        );
        assert_eq!(rover.iterations(), 1);
        assert_eq!(rover.attitude(), Some(report.attitude));
    }

    #[test]
    fn test_pattern_phases_drive_wheels_directly() {
        let mut rover = control_loop(MockImu::level());
        let request = DriveRequest::new(0.5, -0.1);

        rover
            .step(DriveCommand::Pattern {
                phase: PatternPhase::Backward,
                request,
            })
            .unwrap();
        assert_eq!(
            rover.motors().states(),
            (
                Some(MotorState::Backward { duty: 39321 }),
                Some(MotorState::Backward { duty: 26214 })
            )
        );

        rover
            .step(DriveCommand::Pattern {
                phase: PatternPhase::Stop,
                request,
            })
            .unwrap();
        // Stop keeps the duty of the wheel speed
        assert_eq!(
            rover.motors().states(),
            (
                Some(MotorState::Coast { duty: 39321 }),
                Some(MotorState::Coast { duty: 26214 })
            )
        );
    }

    #[test]
    fn test_run_completes_and_coasts() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::for_duration(DriveRequest::new(0.5, -0.1), 100);

        let summary = rover.run(&mut timer, &shutdown, &mut plan).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.iterations, 10);
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_run_paces_with_period() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::for_duration(DriveRequest::stop(), 50);

        let summary = rover.run(&mut timer, &shutdown, &mut plan).unwrap();

        assert_eq!(timer.delays(), summary.iterations);
        assert_eq!(timer.now_ms(), 50);
    }

    #[test]
    fn test_run_with_reports_every_step() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::for_duration(DriveRequest::new(0.2, 0.0), 30);

        let mut reports = 0;
        let summary = rover
            .run_with(&mut timer, &shutdown, &mut plan, |report| {
                assert!((report.wheel_velocities.0 - 0.2).abs() < 1e-6);
                reports += 1;
            })
            .unwrap();

        assert_eq!(reports, summary.iterations);
    }

    #[test]
    fn test_run_cancelled_coasts() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = CancelAfter {
            signal: &shutdown,
            after: 3,
            issued: 0,
        };

        let summary = rover.run(&mut timer, &shutdown, &mut plan).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Cancelled);
        assert_eq!(summary.iterations, 3);
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_run_cancelled_before_start() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        shutdown.request();

        let summary = rover
            .run(&mut timer, &shutdown, &mut TestPattern::default())
            .unwrap();

        assert_eq!(summary.iterations, 0);
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_sensor_fault_coasts() {
        // One read for the bias, two loop iterations, then failure
        let imu = FailingImu {
            inner: MockImu::level(),
            good_reads: 3,
        };
        let mut rover = control_loop(imu);
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::new(DriveRequest::new(0.5, 0.0));

        let result = rover.run(&mut timer, &shutdown, &mut plan);

        assert_eq!(result, Err(LoopError::Sensor(AhrsError::SensorError)));
        assert_eq!(rover.iterations(), 2);
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_motor_fault_coasts() {
        let mut rover: ControlLoop<MockImu, JammedMotor> = ControlLoop::new(
            MockImu::level(),
            MotorPair::new(JammedMotor::default(), JammedMotor::default()),
            &AttitudeParams::default(),
            &DriveParams::default(),
        )
        .unwrap();
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::new(DriveRequest::new(0.5, 0.0));

        let result = rover.run(&mut timer, &shutdown, &mut plan);

        assert_eq!(result, Err(LoopError::Motor(MotorError::HardwareFault)));
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_stale_imu_reuses_last_good() {
        let mut rover = control_loop(LastGoodImu::new(MockImu::level()));
        let first = rover
            .step(DriveCommand::Velocity(DriveRequest::stop()))
            .unwrap();

        rover
            .imu_mut()
            .inner_mut()
            .set_failure(Some(AhrsError::StaleReading));
        let second = rover
            .step(DriveCommand::Velocity(DriveRequest::stop()))
            .unwrap();

        assert_eq!(second.attitude.accel, first.attitude.accel);
        assert_eq!(second.attitude.pitch, first.attitude.pitch);
        assert_eq!(second.attitude.roll, first.attitude.roll);
    }

    #[test]
    fn test_persistent_imu_fault_halts_and_coasts() {
        let mut rover = control_loop(LastGoodImu::new(MockImu::level()));
        rover
            .imu_mut()
            .inner_mut()
            .set_failure(Some(AhrsError::SensorError));
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = ConstantVelocity::new(DriveRequest::new(0.5, 0.0));

        let result = rover.run(&mut timer, &shutdown, &mut plan);

        // First iteration bridges both reads, the next accel read hits the limit
        assert_eq!(result, Err(LoopError::Sensor(AhrsError::SensorError)));
        assert_eq!(rover.iterations(), 1);
        assert!(!rover.estimator().source().is_healthy());
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }

    #[test]
    fn test_pattern_run_one_cycle() {
        let mut rover = control_loop(MockImu::level());
        let mut timer = MockTimer::new();
        let shutdown = ShutdownSignal::new();
        let mut plan = TestPattern::new(DriveRequest::new(0.5, -0.1), 30).with_cycles(1);

        let summary = rover.run(&mut timer, &shutdown, &mut plan).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.iterations, 9);
        assert_eq!(rover.motors().states(), (COAST, COAST));
    }
}
