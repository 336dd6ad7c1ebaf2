//! Error types for acts-as models
//!
//! Provides:
//! - Distinct error types for dispatch, validation and persistence failures
//! - Machine-readable error codes
//! - Classification helpers for callers deciding what to log or retry

use crate::validation::Errors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Dispatch errors (1xxx)
    MethodNotFound,
    UnknownAttribute,
    ReadonlyAttribute,
    TypeMismatch,
    InvalidArgument,

    // Validation errors (2xxx)
    RecordInvalid,

    // Resource errors (4xxx)
    RecordNotFound,
    RecordNotPersisted,
    RecordDestroyed,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Dispatch (1xxx)
            ErrorCode::MethodNotFound => 1001,
            ErrorCode::UnknownAttribute => 1002,
            ErrorCode::ReadonlyAttribute => 1003,
            ErrorCode::TypeMismatch => 1004,
            ErrorCode::InvalidArgument => 1005,

            // Validation (2xxx)
            ErrorCode::RecordInvalid => 2001,

            // Resources (4xxx)
            ErrorCode::RecordNotFound => 4001,
            ErrorCode::RecordNotPersisted => 4002,
            ErrorCode::RecordDestroyed => 4003,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Dispatch errors
    #[error("undefined method `{method}` for {model}")]
    MethodNotFound { model: &'static str, method: String },

    #[error("unknown attribute `{attribute}` for {model}")]
    UnknownAttribute { model: &'static str, attribute: String },

    #[error("attribute `{attribute}` of {model} is read-only")]
    ReadonlyAttribute { model: &'static str, attribute: String },

    #[error("attribute `{attribute}` expects {expected}")]
    TypeMismatch { attribute: String, expected: &'static str },

    #[error("invalid argument for `{method}`: {message}")]
    InvalidArgument { method: String, message: String },

    // Validation errors
    #[error("Validation failed for {model}: {}", .errors.full_messages().join(", "))]
    RecordInvalid { model: &'static str, errors: Errors },

    // Resource errors
    #[error("Couldn't find {model} with id {id}")]
    RecordNotFound { model: &'static str, id: i32 },

    #[error("{model} has not been persisted")]
    RecordNotPersisted { model: &'static str },

    #[error("{model} has been destroyed and cannot be saved")]
    RecordDestroyed { model: &'static str },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MethodNotFound { .. } => ErrorCode::MethodNotFound,
            AppError::UnknownAttribute { .. } => ErrorCode::UnknownAttribute,
            AppError::ReadonlyAttribute { .. } => ErrorCode::ReadonlyAttribute,
            AppError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            AppError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            AppError::RecordInvalid { .. } => ErrorCode::RecordInvalid,
            AppError::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            AppError::RecordNotPersisted { .. } => ErrorCode::RecordNotPersisted,
            AppError::RecordDestroyed { .. } => ErrorCode::RecordDestroyed,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }

    /// Whether the error was caused by the caller (bad method, attribute or data)
    pub fn is_client_error(&self) -> bool {
        self.code().as_code() < 5000
    }

    /// Whether the error originates in the database or the runtime
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Check if this is a missing-record lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::RecordNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::RecordNotFound { model: "product", id: 7 };
        assert_eq!(err.code(), ErrorCode::RecordNotFound);
        assert_eq!(err.code().as_code(), 4001);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Couldn't find product with id 7");
    }

    #[test]
    fn test_method_not_found_is_client_error() {
        let err = AppError::MethodNotFound {
            model: "pen",
            method: "unexisted_method".into(),
        };
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "undefined method `unexisted_method` for pen");
    }

    #[test]
    fn test_record_invalid_lists_messages() {
        let mut errors = Errors::new();
        errors.add("name", "can't be blank");
        errors.add("price", "can't be blank");
        let err = AppError::RecordInvalid { model: "pen", errors };
        assert_eq!(
            err.to_string(),
            "Validation failed for pen: Name can't be blank, Price can't be blank"
        );
    }

    #[test]
    fn test_record_destroyed_is_client_error() {
        let err = AppError::RecordDestroyed { model: "pen" };
        assert_eq!(err.code().as_code(), 4003);
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "pen has been destroyed and cannot be saved");
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert!(err.is_server_error());
    }
}
