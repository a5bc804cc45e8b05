//! Mail server node
//!
//! A server owns the mailboxes of its registered users and knows which other
//! servers it is linked to. Links are created through
//! [`Network::connect`](super::Network::connect) so both ends stay in step.

use super::ServerId;
use crate::mail::{FolderId, MailOperations, Mailbox, Message, UserId};
use std::collections::HashMap;

/// A server in the delivery graph
#[derive(Debug, Clone)]
pub struct MailServer {
    id: ServerId,
    name: String,
    /// Registered users in registration order
    users: Vec<UserId>,
    mailboxes: HashMap<UserId, Mailbox>,
    /// Linked servers in connection order
    neighbors: Vec<ServerId>,
}

impl MailServer {
    pub(crate) fn new(id: ServerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            users: Vec::new(),
            mailboxes: HashMap::new(),
            neighbors: Vec::new(),
        }
    }

    /// Handle of this server
    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a user with a fresh mailbox
    ///
    /// Returns false and leaves the existing mailbox untouched when the user
    /// is already registered here.
    pub fn register_user(&mut self, user: UserId) -> bool {
        if self.mailboxes.contains_key(&user) {
            tracing::warn!(server = %self.name, user = %user, "User already registered");
            return false;
        }

        tracing::info!(server = %self.name, user = %user, "Registered user");
        self.users.push(user.clone());
        self.mailboxes.insert(user.clone(), Mailbox::new(user));
        true
    }

    /// Check whether a user is registered here
    pub fn has_user(&self, user: &UserId) -> bool {
        self.mailboxes.contains_key(user)
    }

    /// Registered users in registration order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Mailbox of a registered user
    pub fn mailbox(&self, user: &UserId) -> Option<&Mailbox> {
        self.mailboxes.get(user)
    }

    /// Mutable mailbox of a registered user
    pub fn mailbox_mut(&mut self, user: &UserId) -> Option<&mut Mailbox> {
        self.mailboxes.get_mut(user)
    }

    /// Mailboxes in registration order
    pub fn mailboxes(&self) -> impl Iterator<Item = &Mailbox> {
        self.users.iter().filter_map(|u| self.mailboxes.get(u))
    }

    /// Linked servers in connection order
    pub fn neighbors(&self) -> &[ServerId] {
        &self.neighbors
    }

    /// Check for a direct link to another server
    pub fn is_connected_to(&self, other: ServerId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Record one side of a link; false if it already exists
    pub(crate) fn add_neighbor(&mut self, other: ServerId) -> bool {
        if other == self.id || self.is_connected_to(other) {
            return false;
        }
        self.neighbors.push(other);
        true
    }

    /// Hand a message to the receiver's mailbox on this server
    ///
    /// Returns the folder the message was filed in, or `None` if the
    /// receiver is not registered here.
    pub fn deliver(&mut self, message: Message) -> Option<FolderId> {
        let mailbox = self.mailboxes.get_mut(&message.receiver)?;
        tracing::info!(
            server = %self.name,
            from = %message.sender,
            to = %message.receiver,
            subject = %message.subject,
            "Delivering message"
        );
        Some(mailbox.receive(message))
    }
}
