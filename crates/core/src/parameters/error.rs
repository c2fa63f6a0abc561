//! Parameter error types

/// Errors from parameter store operations and validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// No parameter registered under that name, or name too long
    UnknownParameter,
    /// Store is full
    StoreFull,
    /// Value text does not parse, or has the wrong kind for its parameter
    InvalidValue,
    /// Value outside the accepted range for its parameter
    OutOfRange,
}

impl ParameterError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterError::UnknownParameter => "unknown parameter",
            ParameterError::StoreFull => "parameter store full",
            ParameterError::InvalidValue => "invalid parameter value",
            ParameterError::OutOfRange => "parameter value out of range",
        }
    }
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
