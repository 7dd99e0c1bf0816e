use crate::parameters::limits::LimitsError;
use crate::parameters::parameter::ParameterError;
use thiserror::Error;

/// The kind of failure, independent of which operation raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Limits built or mutated with a NaN bound or inverted ordering
    Construction,

    /// A value outside a parameter's limits, or limits wider than the category allows
    BoundsViolation,

    /// A missing, fixed or nested inheritor, or freeing a parameter that inherits
    InheritanceRuleViolation,
}

/// Error types for the modelfit-params library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelfitError {
    /// Error constructing or mutating limits.
    #[error("Limits error: {0}")]
    Limits(#[from] LimitsError),

    /// Error from a parameter or registry operation.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

impl ModelfitError {
    /// Classify this error, if it comes from the parameter system
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ModelfitError::Limits(_) => Some(ErrorKind::Construction),
            ModelfitError::Parameter(err) => Some(err.kind()),
            ModelfitError::Other(_) => None,
        }
    }
}

/// Result type alias for modelfit-params operations.
pub type Result<T> = std::result::Result<T, ModelfitError>;

/// Extensions for converting from other error types.
impl From<String> for ModelfitError {
    fn from(s: String) -> Self {
        ModelfitError::Other(s)
    }
}

impl From<&str> for ModelfitError {
    fn from(s: &str) -> Self {
        ModelfitError::Other(s.to_string())
    }
}
