//! Error types and handling
//!
//! This module contains the run-level error type and the policy that decides
//! whether a failed sink write ends the run.

use crate::sinks::SinkError;
use crate::types::{ConfigError, ConfigValidationError};
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur while setting up or running a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Configuration failed validation
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),

    /// A sink could not be opened
    #[error("Failed to open {sink} sink: {source}")]
    SinkSetupError {
        /// Name of the sink
        sink: String,
        /// Underlying failure
        #[source]
        source: SinkError,
    },

    /// A sink failed to write or flush a record
    #[error("{sink} sink failed: {source}")]
    SinkWriteError {
        /// Name of the sink
        sink: String,
        /// Underlying failure
        #[source]
        source: SinkError,
    },

    /// Shutdown signal handling could not be installed
    #[error("Signal handling error: {0}")]
    SignalError(String),
}

impl From<ConfigError> for SimulationError {
    fn from(error: ConfigError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a sink setup error
    pub fn sink_setup_error(sink: impl Into<String>, source: SinkError) -> Self {
        Self::SinkSetupError {
            sink: sink.into(),
            source,
        }
    }

    /// Create a sink write error
    pub fn sink_write_error(sink: impl Into<String>, source: SinkError) -> Self {
        Self::SinkWriteError {
            sink: sink.into(),
            source,
        }
    }

    /// Create a signal handling error
    pub fn signal_error(msg: impl Into<String>) -> Self {
        Self::SignalError(msg.into())
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::ValidationError(_) => false,
            SimulationError::SinkSetupError { .. } => false,
            SimulationError::SinkWriteError { .. } => true,
            SimulationError::SignalError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::ValidationError(_) => "Validation",
            SimulationError::SinkSetupError { .. } => "Sink Setup",
            SimulationError::SinkWriteError { .. } => "Sink Write",
            SimulationError::SignalError(_) => "Signal",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// What the run does after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Count the failure and keep generating
    Skip,
    /// Stop the run
    Abort,
}

/// Decides and logs how the run reacts to errors
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler {
    /// Abort on the first sink failure instead of skipping it
    pub stop_on_error: bool,
}

impl ErrorHandler {
    /// Create a handler; `stop_on_error` turns recoverable errors into aborts
    pub fn new(stop_on_error: bool) -> Self {
        Self { stop_on_error }
    }

    /// Log `error` and pick the recovery strategy
    pub fn handle_error(&self, error: &SimulationError) -> RecoveryStrategy {
        if !error.is_recoverable() {
            error!("Critical error in {}: {}", error.category(), error);
            return RecoveryStrategy::Abort;
        }

        if self.stop_on_error {
            error!("Error in {} with stop-on-error set: {}", error.category(), error);
            RecoveryStrategy::Abort
        } else {
            warn!("Recoverable error in {}: {}", error.category(), error);
            RecoveryStrategy::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn write_failure() -> SimulationError {
        SimulationError::sink_write_error(
            "csv",
            SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full")),
        )
    }

    #[test]
    fn test_error_creation() {
        let config_error = SimulationError::configuration_error("Invalid config");
        assert!(matches!(config_error, SimulationError::ConfigurationError(_)));
        assert_eq!(config_error.to_string(), "Configuration error: Invalid config");

        assert_eq!(write_failure().to_string(), "csv sink failed: I/O error: disk full");
    }

    #[test]
    fn test_error_from_validation_error() {
        let error: SimulationError = ConfigValidationError::InvalidDaysCount(0).into();
        assert!(matches!(error, SimulationError::ValidationError(_)));
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_sink_setup_error_is_fatal() {
        let error = SimulationError::sink_setup_error(
            "csv",
            SinkError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")),
        );
        assert_eq!(error.to_string(), "Failed to open csv sink: I/O error: read-only");
        assert!(!error.is_recoverable());
        assert_eq!(ErrorHandler::new(false).handle_error(&error), RecoveryStrategy::Abort);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(write_failure().category(), "Sink Write");
        assert_eq!(SimulationError::signal_error("no handler").category(), "Signal");
        assert_eq!(
            SimulationError::sink_setup_error(
                "database",
                SinkError::Io(io::Error::new(io::ErrorKind::Other, "refused"))
            )
            .category(),
            "Sink Setup"
        );
    }

    #[test]
    fn test_error_handler_strategy_selection() {
        let lenient = ErrorHandler::new(false);
        let strict = ErrorHandler::new(true);

        assert_eq!(lenient.handle_error(&write_failure()), RecoveryStrategy::Skip);
        assert_eq!(strict.handle_error(&write_failure()), RecoveryStrategy::Abort);

        let fatal = SimulationError::configuration_error("bad");
        assert_eq!(lenient.handle_error(&fatal), RecoveryStrategy::Abort);
    }
}
