//! Simulated two-wheeled robot.
//!
//! Reads the L298N pins of both channels, integrates differential drive
//! kinematics and synthesizes the raw readings an MPU9250 would produce in
//! that pose. Readings are un-corrected with the board's calibration, so
//! the control side has to apply [`CalibrationData`] to get them back.
//!
//! Heading is a compass heading in degrees: 0 = north, clockwise positive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slampibot::devices::WheelEncoder;
use slampibot_core::ahrs::{AhrsError, CalibrationData, ImuSource};

use crate::platform::MotorChannel;

const STANDARD_GRAVITY: f32 = 9.81;

/// Configuration for the simulated robot.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Distance between wheels in meters.
    pub wheel_base_m: f32,
    /// Wheel surface speed at full duty in m/s.
    pub max_wheel_speed_ms: f32,
    /// Encoder counts per meter of wheel travel.
    pub counts_per_meter: f32,
    /// Horizontal magnetic field strength in µT.
    pub field_horizontal_ut: f32,
    /// Vertical magnetic field component in µT.
    pub field_vertical_ut: f32,
    /// Accelerometer noise standard deviation in g.
    pub accel_noise_g: f32,
    /// Magnetometer noise standard deviation in µT.
    pub mag_noise_ut: f32,
    /// Calibration of the emulated IMU board.
    pub board: CalibrationData,
    /// Heading at start in degrees.
    pub initial_heading_deg: f32,
    /// RNG seed for deterministic mode. None = random.
    pub seed: Option<u64>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_base_m: 0.15,
            max_wheel_speed_ms: 0.5,
            counts_per_meter: 2000.0,
            field_horizontal_ut: 30.0,
            field_vertical_ut: -35.0,
            accel_noise_g: 0.005,
            mag_noise_ut: 0.3,
            board: CalibrationData::reference_board(),
            initial_heading_deg: 0.0,
            seed: None,
        }
    }
}

impl RobotConfig {
    /// Default robot with sensor noise turned off.
    pub fn noiseless() -> Self {
        Self {
            accel_noise_g: 0.0,
            mag_noise_ut: 0.0,
            ..Self::default()
        }
    }
}

/// Snapshot of the simulated pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotState {
    /// Compass heading in degrees, [0, 360).
    pub heading_deg: f32,
    /// East position in meters.
    pub x_m: f32,
    /// North position in meters.
    pub y_m: f32,
    /// Forward velocity in m/s.
    pub velocity_ms: f32,
}

/// Which wheel an encoder sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

#[derive(Debug)]
struct World {
    state: RobotState,
    forward_accel_g: f32,
    left_travel_m: f64,
    right_travel_m: f64,
    accel_raw: Vector3<f32>,
    mag_raw: Vector3<f32>,
    imu_fault: Option<AhrsError>,
}

type SharedWorld = Arc<Mutex<World>>;

fn lock(world: &SharedWorld) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated robot body.
pub struct SimRobot {
    config: RobotConfig,
    left: MotorChannel,
    right: MotorChannel,
    world: SharedWorld,
    rng: StdRng,
}

impl SimRobot {
    /// Create a robot driven by the given motor channels.
    ///
    /// Sensor readings for the initial pose are available immediately.
    pub fn new(config: RobotConfig, left: MotorChannel, right: MotorChannel) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = World {
            state: RobotState {
                heading_deg: config.initial_heading_deg.rem_euclid(360.0),
                x_m: 0.0,
                y_m: 0.0,
                velocity_ms: 0.0,
            },
            forward_accel_g: 0.0,
            left_travel_m: 0.0,
            right_travel_m: 0.0,
            accel_raw: Vector3::zeros(),
            mag_raw: Vector3::zeros(),
            imu_fault: None,
        };
        let mut robot = Self {
            config,
            left,
            right,
            world: Arc::new(Mutex::new(world)),
            rng,
        };
        robot.synthesize_sensors();
        robot
    }

    /// Integrate differential drive kinematics for `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt > 0.0 {
            let v_left = self.left.drive() * self.config.max_wheel_speed_ms;
            let v_right = self.right.drive() * self.config.max_wheel_speed_ms;
            let velocity = (v_left + v_right) / 2.0;
            // Left faster than right turns clockwise
            let yaw_rate = ((v_left - v_right) / self.config.wheel_base_m).to_degrees();

            let mut world = lock(&self.world);
            world.forward_accel_g = (velocity - world.state.velocity_ms) / dt / STANDARD_GRAVITY;

            let state = &mut world.state;
            state.velocity_ms = velocity;
            state.heading_deg = (state.heading_deg + yaw_rate * dt).rem_euclid(360.0);
            let heading = state.heading_deg.to_radians();
            state.x_m += velocity * heading.sin() * dt;
            state.y_m += velocity * heading.cos() * dt;

            world.left_travel_m += (v_left * dt) as f64;
            world.right_travel_m += (v_right * dt) as f64;
        }
        self.synthesize_sensors();
    }

    /// Recompute raw sensor readings from the current pose.
    fn synthesize_sensors(&mut self) {
        let (heading, forward_accel_g) = {
            let world = lock(&self.world);
            (world.state.heading_deg.to_radians(), world.forward_accel_g)
        };

        // Board mounted upright: gravity on +y, forward acceleration on z
        let accel = Vector3::new(
            self.gaussian_noise(self.config.accel_noise_g),
            1.0 + self.gaussian_noise(self.config.accel_noise_g),
            forward_accel_g + self.gaussian_noise(self.config.accel_noise_g),
        );

        let field = self.config.field_horizontal_ut;
        let mag = Vector3::new(
            field * heading.sin() + self.gaussian_noise(self.config.mag_noise_ut),
            field * heading.cos() + self.gaussian_noise(self.config.mag_noise_ut),
            self.config.field_vertical_ut + self.gaussian_noise(self.config.mag_noise_ut),
        );

        let board = &self.config.board;
        let accel_raw = accel.component_div(&board.accel_scale) + board.accel_offset;
        let mag_raw = mag.component_div(&board.mag_scale) + board.mag_offset;

        let mut world = lock(&self.world);
        world.accel_raw = accel_raw;
        world.mag_raw = mag_raw;
    }

    /// Generate Gaussian noise using Box-Muller transform.
    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen::<f32>().max(f32::EPSILON);
        let u2: f32 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        z * stddev
    }

    /// Current pose.
    pub fn state(&self) -> RobotState {
        lock(&self.world).state
    }

    /// Make IMU reads fail with `fault` until cleared with `None`.
    pub fn inject_imu_fault(&self, fault: Option<AhrsError>) {
        lock(&self.world).imu_fault = fault;
    }

    /// IMU handle reading this robot's raw sensor values.
    pub fn imu(&self) -> SimImu {
        SimImu {
            world: Arc::clone(&self.world),
        }
    }

    /// Encoder handle for one wheel.
    pub fn encoder(&self, wheel: Wheel) -> SimEncoder {
        SimEncoder {
            world: Arc::clone(&self.world),
            wheel,
            counts_per_meter: self.config.counts_per_meter as f64,
        }
    }
}

impl std::fmt::Debug for SimRobot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRobot")
            .field("state", &self.state())
            .finish()
    }
}

/// Raw MPU9250 readings of a [`SimRobot`].
#[derive(Debug, Clone)]
pub struct SimImu {
    world: SharedWorld,
}

impl ImuSource for SimImu {
    fn read_accel(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let world = lock(&self.world);
        match world.imu_fault {
            Some(e) => Err(e),
            None => Ok(world.accel_raw),
        }
    }

    fn read_mag(&mut self) -> Result<Vector3<f32>, AhrsError> {
        let world = lock(&self.world);
        match world.imu_fault {
            Some(e) => Err(e),
            None => Ok(world.mag_raw),
        }
    }
}

/// Quadrature encoder on one wheel of a [`SimRobot`].
#[derive(Debug, Clone)]
pub struct SimEncoder {
    world: SharedWorld,
    wheel: Wheel,
    counts_per_meter: f64,
}

impl WheelEncoder for SimEncoder {
    fn position(&self) -> i32 {
        let world = lock(&self.world);
        let travel = match self.wheel {
            Wheel::Left => world.left_travel_m,
            Wheel::Right => world.right_travel_m,
        };
        // Hardware counter wraps at 32 bits
        (travel * self.counts_per_meter).round() as i64 as i32
    }
}
