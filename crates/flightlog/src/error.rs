//! Error types for flightlog.
//!
//! This module defines all error types used throughout the flightlog crate.
//! Every fallible operation returns one of these to its immediate caller;
//! nothing in the library swallows an error or substitutes a default value.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A mandatory field was missing or empty on create, update or import.
    #[error("mandatory field '{field}' is missing or empty")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A record key does not have the `YYYY-MM-DD[-(n)]` shape.
    #[error("malformed record key '{key}'")]
    MalformedKey {
        /// The rejected key.
        key: String,
    },

    /// Two records in one dataset share a key.
    #[error("duplicate record key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// No record exists with the given key.
    #[error("no flight with key '{key}'")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// A duration string could not be parsed.
    #[error("invalid duration '{input}': {message}")]
    Format {
        /// The rejected input.
        input: String,
        /// Description of what went wrong.
        message: String,
    },

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

    /// A stored row could not be decoded into a flight record.
    #[error("corrupt record '{key}': {message}")]
    CorruptRecord {
        /// Key of the row that failed to decode.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A backup target already exists.
    #[error("backup already exists at {path}")]
    BackupExists {
        /// The existing file.
        path: PathBuf,
    },

    // === Reference Data Errors ===
    /// An IATA code is not present in the reference airport dataset.
    #[error("unknown airport code '{iata}'")]
    UnknownAirport {
        /// The code that was looked up.
        iata: String,
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
}

/// A specialized Result type for flightlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a malformed key error.
    #[must_use]
    pub fn malformed_key(key: impl Into<String>) -> Self {
        Self::MalformedKey { key: key.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a duration format error.
    #[must_use]
    pub fn format(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a corrupt record error.
    #[must_use]
    pub fn corrupt_record(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the referenced record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a caller input problem that can be re-prompted.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::DuplicateKey { .. } | Self::Format { .. }
        )
    }

    /// Check if this error originates in the underlying storage.
    ///
    /// These are fatal to the operation but not to the process.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::CorruptRecord { .. }
                | Self::BackupExists { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::Validation { field: "carrier" };
        assert_eq!(
            err.to_string(),
            "mandatory field 'carrier' is missing or empty"
        );
        assert!(err.is_validation_error());
        assert!(!err.is_persistence_error());
    }

    #[test]
    fn test_malformed_key_display() {
        let err = Error::malformed_key("2020/01/01");
        assert_eq!(err.to_string(), "malformed record key '2020/01/01'");
    }

    #[test]
    fn test_not_found() {
        let err = Error::not_found("2021-05-01");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("2021-05-01"));
        assert!(!Error::malformed_key("x").is_not_found());
    }

    #[test]
    fn test_format_error_display() {
        let err = Error::format("1:2", "expected three segments");
        let msg = err.to_string();
        assert!(msg.contains("1:2"));
        assert!(msg.contains("expected three segments"));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_corrupt_record_is_persistence_error() {
        let err = Error::corrupt_record("2020-01-01", "bad time");
        assert!(err.is_persistence_error());
        assert!(err.to_string().contains("bad time"));
    }

    #[test]
    fn test_duplicate_key_is_validation_error() {
        let err = Error::DuplicateKey {
            key: "2020-01-01".to_string(),
        };
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("2020-01-01"));
    }

    #[test]
    fn test_unknown_airport_display() {
        let err = Error::UnknownAirport {
            iata: "ZZZ".to_string(),
        };
        assert_eq!(err.to_string(), "unknown airport code 'ZZZ'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(!err.is_persistence_error());
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
            assert!(err.is_persistence_error());
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
            message: "empty database_path".to_string(),
        };
        assert!(err.to_string().contains("empty database_path"));
    }

    #[test]
    fn test_backup_exists_display() {
        let err = Error::BackupExists {
            path: PathBuf::from("/tmp/backup.db"),
        };
        assert!(err.to_string().contains("/tmp/backup.db"));
        assert!(err.is_persistence_error());
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
