//! Error handling for the driver.
//!
//! Library errors from the registry, the frame and the barrier set are
//! wrapped unchanged so callers can still match on them.

use std::path::PathBuf;

use hsgen_lir::FrameError;
use hsgen_mark::MarkError;
use hsgen_zgc::BarrierError;
use thiserror::Error;

/// Errors reading or checking a host description.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The host description file does not exist.
    #[error("Host description not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The host description is not valid TOML for [`HostConfig`](crate::HostConfig).
    #[error("Failed to parse host description: {0}")]
    Parse(String),

    /// The host description could not be written back out.
    #[error("Failed to serialize host description: {0}")]
    Serialize(String),

    /// A value parsed but makes no sense for a host.
    #[error("Invalid host description: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type of the driver.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mark(#[from] MarkError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Barrier(#[from] BarrierError),

    /// A method was compiled more often than the host allows
    ///
    /// **When returned:** `CompilationCounters::record` once a method's
    /// count passes the configured limit
    ///
    /// **Recovery strategy:** None. Repeated recompilation means the
    /// compiler keeps producing code the host throws away; the process
    /// exits
    #[error("Compiled method {method} {count} times, exceeding the limit of {limit}")]
    RecompilationLimit {
        method: String,
        count: u32,
        limit: u32,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    /// Check if this error indicates a bug in the compiler
    pub fn is_bug(&self) -> bool {
        match self {
            DriverError::Mark(err) => err.is_bug(),
            DriverError::Barrier(err) => err.is_bug(),
            DriverError::RecompilationLimit { .. } => true,
            DriverError::Config(_) | DriverError::Frame(_) | DriverError::Json(_) => false,
        }
    }

    /// Whether this error must take the whole process down rather than
    /// abort one compilation
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, DriverError::RecompilationLimit { .. })
    }
}

/// Result type alias using DriverError.
pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hsgen_mark::Mark;
    use hsgen_zgc::BarrierType;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid("basic_lock_size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid host description: basic_lock_size must be positive"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ConfigError::NotFound(PathBuf::from("/tmp/host.toml"));
        assert_eq!(err.to_string(), "Host description not found: /tmp/host.toml");
    }

    #[test]
    fn test_wrapped_errors_are_transparent() {
        let err: DriverError = MarkError::Unavailable(Mark::PollFar).into();
        assert_eq!(err.to_string(), "Unavailable mark: POLL_FAR");
        assert!(err.is_bug());
        assert!(!err.is_process_fatal());
    }

    #[test]
    fn test_barrier_error_conversion() {
        let err: DriverError = BarrierError::UnexpectedBarrierType(BarrierType::None).into();
        assert!(matches!(err, DriverError::Barrier(_)));
        assert!(err.is_bug());
    }

    #[test]
    fn test_recompilation_limit() {
        let err = DriverError::RecompilationLimit {
            method: "java.lang.String.hashCode()I".to_string(),
            count: 4,
            limit: 3,
        };
        assert_eq!(
            err.to_string(),
            "Compiled method java.lang.String.hashCode()I 4 times, exceeding the limit of 3"
        );
        assert!(err.is_process_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DriverError = ConfigError::from(io_err).into();
        assert!(matches!(err, DriverError::Config(ConfigError::Io(_))));
    }
}
