use slampibot::platform::PlatformError;
use slampibot::rover::LoopError;
use slampibot_core::parameters::ParameterError;

/// Errors that can occur during simulator operations.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("GPIO pin {0} out of range")]
    PinOutOfRange(u8),

    #[error("GPIO pin {0} already allocated")]
    PinInUse(u8),

    #[error("Platform error: {0}")]
    Platform(PlatformError),

    #[error("Control loop error: {0}")]
    Control(LoopError),

    #[error("Parameter error: {0}")]
    Parameter(ParameterError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Simulation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<PlatformError> for SimulatorError {
    fn from(e: PlatformError) -> Self {
        SimulatorError::Platform(e)
    }
}

impl From<LoopError> for SimulatorError {
    fn from(e: LoopError) -> Self {
        SimulatorError::Control(e)
    }
}

impl From<ParameterError> for SimulatorError {
    fn from(e: ParameterError) -> Self {
        SimulatorError::Parameter(e)
    }
}
