//! Error types for the simfleet CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for simfleet operations.
///
/// Errors are project-scoped: a workflow step returns one of these, the batch
/// runner reports it against the project name and moves on to the next project.
#[derive(Error, Debug)]
pub enum FleetError {
    /// User provided invalid arguments or a precondition is not met.
    #[error("{0}")]
    UserError(String),

    /// The configuration file could not be read, parsed, or validated.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// Unity Editor could not be located, launched, or timed out.
    #[error("Unity Editor failed: {0}")]
    UnityError(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl FleetError {
    /// Returns the process exit code for this error.
    ///
    /// The CLI only distinguishes success from failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            FleetError::UserError(_)
            | FleetError::ConfigError(_)
            | FleetError::GitError(_)
            | FleetError::UnityError(_)
            | FleetError::IoError(_) => exit_codes::FAILURE,
        }
    }

    /// Build an `IoError` that names the path being operated on.
    pub fn io(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        FleetError::IoError(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

/// Result type alias for simfleet operations.
pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn every_error_maps_to_failure_exit_code() {
        let errors = [
            FleetError::UserError("bad argument".to_string()),
            FleetError::ConfigError("bad yaml".to_string()),
            FleetError::GitError("push rejected".to_string()),
            FleetError::UnityError("editor not found".to_string()),
            FleetError::IoError("disk full".to_string()),
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), exit_codes::FAILURE);
        }
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = FleetError::GitError("checkout failed".to_string());
        assert_eq!(err.to_string(), "Git operation failed: checkout failed");

        let err = FleetError::ConfigError("max_workers must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: max_workers must be greater than 0"
        );
    }

    #[test]
    fn io_helper_includes_path_and_action() {
        let err = FleetError::io(
            "read",
            Path::new("Packages/manifest.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let msg = err.to_string();
        assert!(msg.contains("failed to read"));
        assert!(msg.contains("Packages/manifest.json"));
    }
}
