//! Error types for dellos10.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for dellos10 operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The session failed to run a command or apply configuration.
    #[error("Transport error on '{command}': {source}")]
    Transport {
        command: String,
        #[source]
        source: TransportError,
    },

    /// Raw output could not be aligned to the expected shape
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Structured records disagreed with each other
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Configuration transaction errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform definition errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Wrap a session failure with the command that triggered it.
    pub fn transport(command: impl Into<String>, source: TransportError) -> Self {
        Self::Transport {
            command: command.into(),
            source,
        }
    }

    /// Returns `true` when the session itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` for parse failures.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::Parse(ParseError::MalformedOutput { .. }))
    }

    /// Returns `true` for transaction state machine violations.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Self::Config(
                ConfigError::InvalidStateTransition { .. }
                    | ConfigError::CandidateAlreadyLoaded { .. }
            )
        )
    }

    /// Returns `true` for operations the platform does not offer.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Config(ConfigError::UnsupportedOperation { .. }))
    }
}

/// Failures reported by a [`DeviceSession`](crate::session::DeviceSession).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other session-level failure
    #[error("Session error: {message}")]
    Session { message: String },

    /// The device answered with an error banner
    #[error("Command rejected by device: {output}")]
    CommandRejected { output: String },
}

/// Parser errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Output could not be aligned to the shape expected for the command
    #[error("Malformed output from '{command}': {reason} (near {fragment:?})")]
    MalformedOutput {
        command: String,
        reason: String,
        fragment: String,
    },
}

/// Normalizer errors.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Two records describing one entity carried different values
    #[error(
        "Inconsistent {entity} '{key}': field '{field}' is both {first:?} and {second:?}"
    )]
    InconsistentRecord {
        entity: String,
        key: String,
        field: String,
        first: String,
        second: String,
    },
}

/// Configuration transaction errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Operation not allowed from the current candidate state
    #[error("Cannot {operation} while candidate is {state}")]
    InvalidStateTransition { operation: String, state: String },

    /// A candidate is already staged
    #[error("Candidate revision {revision} is already loaded - commit or discard it first")]
    CandidateAlreadyLoaded { revision: u64 },

    /// The platform has no way to perform the operation
    #[error("Operation '{operation}' is not supported on this platform")]
    UnsupportedOperation { operation: String },

    /// The device did not acknowledge the candidate
    #[error("Commit of revision {revision} failed: {detail}")]
    CommitFailed { revision: u64, detail: String },
}

/// Driver layer errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Caller supplied an argument the device cannot accept
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Platform definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No platform registered under the requested name
    #[error("Unknown platform: '{name}'")]
    UnknownPlatform { name: String },

    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },
}

/// Result type alias using dellos10's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_carries_command() {
        let err = Error::transport("show version", TransportError::Disconnected);
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "Transport error on 'show version': Connection disconnected"
        );
    }

    #[test]
    fn test_state_error_helpers() {
        let err: Error = ConfigError::CandidateAlreadyLoaded { revision: 3 }.into();
        assert!(err.is_invalid_state());
        assert!(!err.is_unsupported());

        let err: Error = ConfigError::UnsupportedOperation {
            operation: "rollback".into(),
        }
        .into();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_malformed_output_display() {
        let err: Error = ParseError::MalformedOutput {
            command: "show ip route | display-json".into(),
            reason: "expected array".into(),
            fragment: "{}".into(),
        }
        .into();
        assert!(err.is_malformed_output());
        assert!(err.to_string().contains("expected array"));
    }
}
