//! Mail operations abstraction
//!
//! The capability set every mailbox offers to the delivery graph.

use super::{FolderId, Message, UserId};

/// Trait for anything that can compose, accept and list mail
pub trait MailOperations {
    /// Build an outgoing message and keep the sender's copy
    fn compose(
        &mut self,
        receiver: UserId,
        subject: &str,
        body: &str,
        urgent: bool,
    ) -> Message;

    /// Accept an incoming message, returning the folder it was filed in
    fn receive(&mut self, message: Message) -> FolderId;

    /// Messages in the inbox
    fn list_messages(&self) -> &[Message];
}
