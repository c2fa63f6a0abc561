//! Pin-level L298N channel driver
//!
//! Drives one L298N channel through a PWM enable pin and two direction
//! GPIOs. The state machine itself is [`MotorState`] from the core crate;
//! this driver only turns states into pin writes.
//!
//! Writes are skipped when the requested pin image equals the one already
//! applied, so re-sending the same command every loop iteration costs
//! nothing on the bus.

use slampibot_core::motor::{DriverOutputs, MotorDriver, MotorError, MotorState};

use crate::platform::{GpioInterface, PlatformError, PwmInterface};

/// One L298N channel (ENA/IN1/IN2 or ENB/IN3/IN4)
pub struct L298nMotor<P, A, B>
where
    P: PwmInterface,
    A: GpioInterface,
    B: GpioInterface,
{
    enable: P,
    in1: A,
    in2: B,
    max_duty: u16,
    state: Option<MotorState>,
    applied: Option<DriverOutputs>,
}

impl<P, A, B> L298nMotor<P, A, B>
where
    P: PwmInterface,
    A: GpioInterface,
    B: GpioInterface,
{
    /// Wrap initialized pins
    ///
    /// No pin is written until the first command.
    pub fn new(enable: P, in1: A, in2: B, max_duty: u16) -> Self {
        Self {
            enable,
            in1,
            in2,
            max_duty,
            state: None,
            applied: None,
        }
    }

    /// Set the enable pin frequency and turn PWM output on
    pub fn configure(&mut self, pwm_freq_hz: u32) -> Result<(), PlatformError> {
        self.enable.set_frequency(pwm_freq_hz)?;
        self.enable.enable();
        Ok(())
    }

    /// Pin image last written, `None` before the first command
    pub fn applied(&self) -> Option<DriverOutputs> {
        self.applied
    }

    pub fn enable_pin(&self) -> &P {
        &self.enable
    }

    pub fn direction_pins(&self) -> (&A, &B) {
        (&self.in1, &self.in2)
    }

    /// Direction pins first, then duty
    ///
    /// The falling direction pin is written before the rising one, so IN1
    /// and IN2 are never both high. A reversal drops the enable duty to zero
    /// before touching the direction pins.
    fn write(&mut self, outputs: DriverOutputs) -> Result<(), PlatformError> {
        if let Some(prev) = self.applied {
            let reversing = prev.in1 != outputs.in1 && prev.in2 != outputs.in2;
            if reversing && prev.enable_duty != 0 {
                self.enable.set_duty_cycle(0.0)?;
            }
        }

        if outputs.in1 {
            self.in2.set_level(outputs.in2)?;
            self.in1.set_level(true)?;
        } else {
            self.in1.set_level(false)?;
            self.in2.set_level(outputs.in2)?;
        }
        self.enable.set_duty_cycle(outputs.enable_fraction())?;
        Ok(())
    }

    fn drive(&mut self, next: MotorState) -> Result<(), MotorError> {
        let outputs = next.outputs();
        if self.applied == Some(outputs) {
            self.state = Some(next);
            return Ok(());
        }

        match self.write(outputs) {
            Ok(()) => {
                self.applied = Some(outputs);
                self.state = Some(next);
                Ok(())
            }
            Err(e) => {
                // Partially written; force a full rewrite next time
                self.applied = None;
                crate::log_error!("L298N write failed: {}", e);
                Err(MotorError::HardwareFault)
            }
        }
    }
}

impl<P, A, B> MotorDriver for L298nMotor<P, A, B>
where
    P: PwmInterface,
    A: GpioInterface,
    B: GpioInterface,
{
    fn forward(&mut self, speed: f32) -> Result<(), MotorError> {
        self.drive(MotorState::forward(speed, self.max_duty))
    }

    fn backward(&mut self, speed: f32) -> Result<(), MotorError> {
        self.drive(MotorState::backward(speed, self.max_duty))
    }

    fn stop(&mut self, speed: f32) -> Result<(), MotorError> {
        self.drive(MotorState::stop(speed, self.max_duty))
    }

    fn state(&self) -> Option<MotorState> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockGpio, MockPwm};
    use crate::platform::{GpioMode, PwmConfig, PwmInterface};
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestMotor = L298nMotor<MockPwm, MockGpio, MockGpio>;

    fn motor() -> TestMotor {
        L298nMotor::new(
            MockPwm::default(),
            MockGpio::new_output(),
            MockGpio::new_output(),
            u16::MAX,
        )
    }

    fn pins(motor: &TestMotor) -> (f32, bool, bool) {
        let (in1, in2) = motor.direction_pins();
        (motor.enable_pin().duty_cycle(), in1.read(), in2.read())
    }

    #[test]
    fn test_no_writes_before_first_command() {
        let motor = motor();
        assert_eq!(motor.state(), None);
        assert_eq!(motor.applied(), None);
        assert_eq!(motor.enable_pin().writes(), 0);
    }

    #[test]
    fn test_configure() {
        let mut motor = L298nMotor::new(
            MockPwm::new(PwmConfig {
                frequency: 50,
                duty_cycle: 0.0,
            }),
            MockGpio::new_output(),
            MockGpio::new_output(),
            u16::MAX,
        );
        motor.configure(1000).unwrap();
        assert_eq!(motor.enable_pin().frequency(), 1000);
        assert!(motor.enable_pin().is_enabled());
    }

    #[test]
    fn test_forward_pins() {
        let mut motor = motor();
        motor.forward(1.0).unwrap();
        assert_eq!(pins(&motor), (1.0, false, true));
    }

    #[test]
    fn test_backward_pins() {
        let mut motor = motor();
        motor.backward(-1.0).unwrap();
        assert_eq!(pins(&motor), (1.0, true, false));
    }

    #[test]
    fn test_stop_pins_keep_duty() {
        let mut motor = motor();
        motor.forward(0.6).unwrap();
        motor.stop(0.4).unwrap();

        let (duty, in1, in2) = pins(&motor);
        assert!(!in1 && !in2);
        assert!((duty - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_coast_pins() {
        let mut motor = motor();
        motor.forward(0.6).unwrap();
        motor.coast().unwrap();
        assert_eq!(pins(&motor), (0.0, false, false));
    }

    #[test]
    fn test_repeated_command_skips_writes() {
        let mut motor = motor();
        motor.forward(0.5).unwrap();
        motor.forward(0.5).unwrap();
        motor.forward(0.5).unwrap();

        assert_eq!(motor.enable_pin().writes(), 1);
        let (in1, in2) = motor.direction_pins();
        assert_eq!(in1.writes(), 1);
        assert_eq!(in2.writes(), 1);
    }

    #[test]
    fn test_equal_outputs_from_different_states_skip_writes() {
        let mut motor = motor();
        // stop(0.0) and stop(-0.7) both map to Coast { duty: 0 }
        motor.stop(0.0).unwrap();
        motor.stop(-0.7).unwrap();
        assert_eq!(motor.enable_pin().writes(), 1);
    }

    #[test]
    fn test_write_failure_reports_fault_and_retries() {
        let mut motor = motor();
        motor.enable.set_fail(true);
        assert_eq!(motor.forward(0.5), Err(MotorError::HardwareFault));
        assert_eq!(motor.state(), None);
        assert_eq!(motor.applied(), None);

        motor.enable.set_fail(false);
        motor.forward(0.5).unwrap();
        assert_eq!(motor.enable_pin().writes(), 1);
        assert!(motor.applied().is_some());
    }

    #[test]
    fn test_reversal_zeroes_duty_first() {
        let mut motor = motor();
        motor.forward(0.8).unwrap();
        motor.backward(0.8).unwrap();

        // zero, then the new duty
        assert_eq!(motor.enable_pin().writes(), 3);
        let (duty, in1, in2) = pins(&motor);
        assert!(in1 && !in2);
        assert!((duty - 0.8).abs() < 1e-4);

        // Forward to stop is not a reversal
        motor.stop(0.8).unwrap();
        assert_eq!(motor.enable_pin().writes(), 4);
    }

    /// Pin image shared by a set of recording pins
    #[derive(Default)]
    struct Bridge {
        duty: f32,
        in1: bool,
        in2: bool,
        shoot_through: u32,
    }

    impl Bridge {
        fn check(&mut self) {
            if self.in1 && self.in2 && self.duty > 0.0 {
                self.shoot_through += 1;
            }
        }
    }

    type Shared = Rc<RefCell<Bridge>>;

    struct RecordingPwm(Shared);

    impl PwmInterface for RecordingPwm {
        fn set_duty_cycle(&mut self, duty_cycle: f32) -> crate::platform::Result<()> {
            let mut bridge = self.0.borrow_mut();
            bridge.duty = duty_cycle;
            bridge.check();
            Ok(())
        }

        fn duty_cycle(&self) -> f32 {
            self.0.borrow().duty
        }

        fn set_frequency(&mut self, _frequency: u32) -> crate::platform::Result<()> {
            Ok(())
        }

        fn frequency(&self) -> u32 {
            1000
        }

        fn enable(&mut self) {}

        fn disable(&mut self) {}

        fn is_enabled(&self) -> bool {
            true
        }
    }

    struct RecordingPin {
        bridge: Shared,
        first: bool,
    }

    impl RecordingPin {
        fn set(&mut self, high: bool) -> crate::platform::Result<()> {
            let mut bridge = self.bridge.borrow_mut();
            if self.first {
                bridge.in1 = high;
            } else {
                bridge.in2 = high;
            }
            bridge.check();
            Ok(())
        }
    }

    impl GpioInterface for RecordingPin {
        fn set_high(&mut self) -> crate::platform::Result<()> {
            self.set(true)
        }

        fn set_low(&mut self) -> crate::platform::Result<()> {
            self.set(false)
        }

        fn read(&self) -> bool {
            let bridge = self.bridge.borrow();
            if self.first {
                bridge.in1
            } else {
                bridge.in2
            }
        }

        fn set_mode(&mut self, _mode: GpioMode) -> crate::platform::Result<()> {
            Ok(())
        }

        fn mode(&self) -> GpioMode {
            GpioMode::OutputPushPull
        }
    }

    #[test]
    fn test_direction_changes_never_drive_both_inputs_high() {
        let bridge = Shared::default();
        let mut motor = L298nMotor::new(
            RecordingPwm(bridge.clone()),
            RecordingPin {
                bridge: bridge.clone(),
                first: true,
            },
            RecordingPin {
                bridge: bridge.clone(),
                first: false,
            },
            u16::MAX,
        );

        for _ in 0..3 {
            motor.forward(1.0).unwrap();
            motor.backward(1.0).unwrap();
            motor.stop(0.5).unwrap();
            motor.backward(0.5).unwrap();
            motor.forward(0.5).unwrap();
        }

        assert_eq!(bridge.borrow().shoot_through, 0);
    }

    #[test]
    fn test_reduced_max_duty() {
        let mut motor = L298nMotor::new(
            MockPwm::default(),
            MockGpio::new_output(),
            MockGpio::new_output(),
            32768,
        );
        motor.forward(1.0).unwrap();
        assert_eq!(motor.state(), Some(MotorState::Forward { duty: 32768 }));
        assert!((motor.enable_pin().duty_cycle() - 0.5).abs() < 1e-4);
    }
}
