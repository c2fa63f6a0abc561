//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode},
    Result,
};

/// Mock GPIO implementation
///
/// Tracks level, mode and the number of level writes for test verification.
#[derive(Debug)]
pub struct MockGpio {
    state: bool,
    mode: GpioMode,
    writes: u32,
    fail: bool,
}

impl MockGpio {
    /// Create a new mock GPIO in output mode, initially low
    pub fn new_output() -> Self {
        Self {
            state: false,
            mode: GpioMode::OutputPushPull,
            writes: 0,
            fail: false,
        }
    }

    /// Create a new mock GPIO in input mode
    pub fn new_input() -> Self {
        Self {
            mode: GpioMode::Input,
            ..Self::new_output()
        }
    }

    /// Set the input state (for simulating input pin reads)
    pub fn set_input_state(&mut self, high: bool) {
        self.state = high;
    }

    /// Make every following write fail
    pub fn set_fail(&mut self, fail: bool) {
        self.fail = fail;
    }

    /// Number of successful level writes
    pub fn writes(&self) -> u32 {
        self.writes
    }

    fn write(&mut self, level: bool) -> Result<()> {
        if self.fail {
            return Err(PlatformError::Gpio(GpioError::PinInUse));
        }
        match self.mode {
            GpioMode::OutputPushPull | GpioMode::OutputOpenDrain => {
                self.state = level;
                self.writes += 1;
                Ok(())
            }
            _ => Err(PlatformError::Gpio(GpioError::InvalidMode)),
        }
    }
}

impl GpioInterface for MockGpio {
    fn set_high(&mut self) -> Result<()> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.write(false)
    }

    fn read(&self) -> bool {
        self.state
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
