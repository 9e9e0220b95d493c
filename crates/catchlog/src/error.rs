//! Error types for catchlog.
//!
//! This module defines the errors that can escape the library. Field validation
//! failures are not errors: they are returned as data inside a form outcome
//! (see [`crate::wizard::FormOutcome`]).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for catchlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A document addressed by primary key does not exist.
    #[error("no document '{id}' in collection '{collection}'")]
    DocumentNotFound {
        /// Collection that was searched.
        collection: String,
        /// Primary key that was not found.
        id: String,
    },

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

    // === Wizard Errors ===
    /// The trip referenced by a page does not exist.
    #[error("trip not found: {id}")]
    TripNotFound {
        /// The trip id that was requested.
        id: String,
    },

    /// A trip status change would move backwards.
    #[error("cannot move trip from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// A trip cannot move past the catch log while stored catches fail
    /// validation.
    #[error("trip {trip_id} has {count} catch(es) that need fixing")]
    CatchesInvalid {
        /// The trip whose catches failed.
        trip_id: String,
        /// How many catches failed.
        count: usize,
    },

    /// A destructive action was requested without confirmation.
    #[error("{action} requires confirmation")]
    ConfirmationRequired {
        /// The action that was not confirmed.
        action: &'static str,
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

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for catchlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a trip-not-found error.
    #[must_use]
    pub fn trip_not_found(id: impl Into<String>) -> Self {
        Self::TripNotFound { id: id.into() }
    }

    /// Create a document-not-found error.
    #[must_use]
    pub fn document_not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Check if this error means a record is missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TripNotFound { .. } | Self::DocumentNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::trip_not_found("abc");
        assert_eq!(err.to_string(), "trip not found: abc");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::trip_not_found("x").is_not_found());
        assert!(Error::document_not_found("catches", "y").is_not_found());
        assert!(!Error::internal("z").is_not_found());
    }

    #[test]
    fn test_document_not_found_display() {
        let err = Error::document_not_found("catches", "c-1");
        let msg = err.to_string();
        assert!(msg.contains("catches"));
        assert!(msg.contains("c-1"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            from: "submitted".to_string(),
            to: "in-progress".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot move trip from 'submitted' to 'in-progress'"
        );
    }

    #[test]
    fn test_catches_invalid_display() {
        let err = Error::CatchesInvalid {
            trip_id: "t-1".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "trip t-1 has 2 catch(es) that need fixing");
    }

    #[test]
    fn test_confirmation_required_display() {
        let err = Error::ConfirmationRequired {
            action: "deleting a catch",
        };
        assert_eq!(err.to_string(), "deleting a catch requires confirmation");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
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
            message: "species list is empty".to_string(),
        };
        assert!(err.to_string().contains("species list is empty"));
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
