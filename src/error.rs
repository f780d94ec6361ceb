//! Error handling module for dd-agent-conf
//!
//! Every failure of the classify → resolve → render pipeline is one of these
//! variants. All of them are fatal: no partial configuration is ever produced.

use thiserror::Error;

/// Main error type for configuration rendering
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentConfError {
    /// The host operating system is not one of the supported families.
    ///
    /// The message shape is matched by callers, keep it stable.
    #[error("Unsupported operatingsystem: {0}")]
    UnsupportedOperatingSystem(String),

    /// An override named a parameter that is not in the parameter table
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// An override value does not match the parameter's declared type
    #[error("Invalid value for parameter {name}: expected {expected}, got {found}")]
    InvalidParameterType {
        name: String,
        expected: String,
        found: String,
    },
}

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, AgentConfError>;

// Convenient error constructors
impl AgentConfError {
    /// Create an unsupported operating system error
    pub fn unsupported_os(name: impl Into<String>) -> Self {
        Self::UnsupportedOperatingSystem(name.into())
    }

    /// Create an unknown parameter error
    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        Self::UnknownParameter(name.into())
    }

    /// Create an invalid parameter type error
    pub fn invalid_type(
        name: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidParameterType {
            name: name.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Name of the offending parameter, when the error concerns one
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::UnknownParameter(name) => Some(name),
            Self::InvalidParameterType { name, .. } => Some(name),
            Self::UnsupportedOperatingSystem(_) => None,
        }
    }
}
