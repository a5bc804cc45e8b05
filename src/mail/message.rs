//! Mail message types
//!
//! A message is a value record: once built, only its urgency flag changes.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique message identifier
///
/// Subjects are not unique, so every message also gets an id at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new message ID
    pub fn new() -> Self {
        Self(format!(
            "msg-{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            unique_suffix()
        ))
    }

    /// Create from an existing string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nanosecond clock plus a process-wide counter, hex encoded
fn unique_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:04x}", nanos, counter)
}

/// A mail message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,

    /// Sender
    pub sender: UserId,

    /// Recipient
    pub receiver: UserId,

    /// Subject line
    pub subject: String,

    /// Message body
    pub body: String,

    /// When the message was created
    pub created_at: DateTime<Utc>,

    /// Urgency flag, the only field toggled after creation
    #[serde(default)]
    pub urgent: bool,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(
        sender: UserId,
        receiver: UserId,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            subject: subject.into(),
            body: body.into(),
            created_at: Utc::now(),
            urgent: false,
        }
    }

    /// Mark as urgent
    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Override the creation time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Case-insensitive substring match on the subject
    pub fn subject_contains(&self, text: &str) -> bool {
        self.subject.to_lowercase().contains(&text.to_lowercase())
    }

    /// Lowercased subject and body, the text filters run against
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.subject, self.body).to_lowercase()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let urgency = if self.urgent { " (URGENT)" } else { "" };
        write!(
            f,
            "Subject: {}{} | From: {} | To: {} | Date: {}",
            self.subject,
            urgency,
            self.sender,
            self.receiver,
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
