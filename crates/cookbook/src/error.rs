//! Error types for cookbook.
//!
//! This module defines all error types used throughout the cookbook crate,
//! separating form validation, lookup, remote mirroring and I/O failures so
//! callers can decide which of them are fatal to an interaction.

use std::path::PathBuf;
use thiserror::Error;

use crate::recipe::RecipeId;
use crate::view::{Action, ViewState};

/// The main error type for cookbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// A recipe failed validation before being written.
    #[error("{message}")]
    Validation {
        /// User-facing description of the problem.
        message: String,
    },

    // === Lookup Errors ===
    /// No recipe matched the given identifier.
    #[error("recipe not found: {0}")]
    RecipeNotFound(RecipeId),

    /// No recipe matched the given name.
    #[error("no recipe named '{0}'")]
    NameNotFound(String),

    /// An action was issued that the current view does not accept.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// The view state the action was issued in.
        state: ViewState,
        /// The rejected action.
        action: Action,
    },

    // === Remote Errors ===
    /// The remote content API answered with a non-success status.
    #[error("remote {operation} of {path} failed with HTTP {status}: {message}")]
    Remote {
        /// The HTTP verb or logical operation.
        operation: &'static str,
        /// The remote path involved.
        path: String,
        /// The HTTP status code.
        status: u16,
        /// Body or reason returned by the server.
        message: String,
    },

    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote mirror is not configured.
    #[error("remote mirror is not configured: {0}")]
    RemoteNotConfigured(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a recipe or journal file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path that couldn't be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for cookbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a remote status error.
    #[must_use]
    pub fn remote(
        operation: &'static str,
        path: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote {
            operation,
            path: path.into(),
            status,
            message: message.into(),
        }
    }

    /// Check if this error was raised by form validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error is a benign "not found".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecipeNotFound(_) | Self::NameNotFound(_))
    }

    /// Check if this error came from the remote mirror.
    ///
    /// Remote errors never invalidate the local operation that preceded them.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Remote { .. } | Self::Http(_) | Self::RemoteNotConfigured(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("recipe name required");
        assert_eq!(err.to_string(), "recipe name required");
        assert!(err.is_validation());
        assert!(!err.is_remote());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::remote("PUT", "recipes/soup.json", 409, "sha mismatch");
        let msg = err.to_string();
        assert!(msg.contains("PUT"));
        assert!(msg.contains("recipes/soup.json"));
        assert!(msg.contains("409"));
        assert!(msg.contains("sha mismatch"));
        assert!(err.is_remote());
    }

    #[test]
    fn test_not_found_errors() {
        assert!(Error::NameNotFound("Soup".to_string()).is_not_found());
        assert!(Error::RecipeNotFound(RecipeId::new()).is_not_found());
        assert!(!Error::validation("x").is_not_found());
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            state: ViewState::Browsing,
            action: Action::ConfirmDelete,
        };
        let msg = err.to_string();
        assert!(msg.contains("confirm delete"));
        assert!(msg.contains("browsing"));
    }

    #[test]
    fn test_remote_not_configured() {
        let err = Error::RemoteNotConfigured("missing token".to_string());
        assert!(err.is_remote());
        assert!(err.to_string().contains("missing token"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "remote.token is required".to_string(),
        };
        assert!(err.to_string().contains("remote.token"));
    }

    #[test]
    fn test_file_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::FileWrite {
            path: PathBuf::from("/root/forbidden/soup.json"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden/soup.json"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
