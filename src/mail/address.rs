//! Mailbox addressing
//!
//! Provides a validated identifier for the owner of a mailbox.
//!
//! # Address Format
//!
//! A user id is any non-empty string of alphanumerics, hyphens, underscores,
//! dots and at most one `@`:
//!
//! - `alice` - bare user name
//! - `alice@mail.com` - email-like name
//!
//! # Examples
//!
//! ```
//! use mailnet::mail::UserId;
//!
//! let alice: UserId = "alice@mail.com".parse().unwrap();
//! assert_eq!(alice.local_part(), "alice");
//! assert_eq!(alice.domain(), Some("mail.com"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for user id parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("user id cannot be empty")]
    Empty,

    #[error("user id contains invalid characters: '{0}'")]
    InvalidCharacters(String),

    #[error("user id has more than one '@': '{0}'")]
    InvalidFormat(String),
}

/// A validated user identifier
///
/// User ids compare case-sensitively: `Alice` and `alice` are two mailboxes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new user id
    ///
    /// # Errors
    /// Returns an error if the id is empty, contains whitespace or other
    /// invalid characters, or has more than one `@`.
    pub fn new(id: impl Into<String>) -> Result<Self, AddressError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`, or the whole id
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    /// Part after the `@`, if any
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, domain)| domain)
    }

    fn validate(id: &str) -> Result<(), AddressError> {
        if id.is_empty() {
            return Err(AddressError::Empty);
        }

        if id.matches('@').count() > 1 {
            return Err(AddressError::InvalidFormat(id.to_string()));
        }

        // Allow alphanumeric, hyphen, underscore, dot and the separator
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            return Err(AddressError::InvalidCharacters(id.to_string()));
        }

        if id.starts_with('@') || id.ends_with('@') {
            return Err(AddressError::InvalidFormat(id.to_string()));
        }

        Ok(())
    }
}

impl FromStr for UserId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for UserId {
    type Error = AddressError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
