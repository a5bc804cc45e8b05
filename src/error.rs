//! Error types for mailnet
//!
//! Lookups that simply find nothing (a folder, a message, an unreachable
//! receiver) are reported through `bool`/`Option` results. This enum covers
//! caller mistakes and the configuration layer.

use crate::config::ValidationError;
use crate::mail::AddressError;
use thiserror::Error;

/// Result type alias for mailnet operations
pub type Result<T> = std::result::Result<T, MailnetError>;

/// Error type for mailnet operations
#[derive(Error, Debug)]
pub enum MailnetError {
    /// No server with this handle or name
    #[error("Unknown server: {0}")]
    UnknownServer(String),

    /// User not registered on the given server
    #[error("Unknown user '{user}' on server '{server}'")]
    UnknownUser { server: String, user: String },

    /// Malformed user id
    #[error("Invalid user id: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_message() {
        let err = MailnetError::UnknownUser {
            server: "serverA".to_string(),
            user: "zoe".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown user 'zoe' on server 'serverA'");
    }

    #[test]
    fn test_address_error_conversion() {
        let err: MailnetError = AddressError::Empty.into();
        assert!(matches!(err, MailnetError::InvalidAddress(AddressError::Empty)));
    }
}
