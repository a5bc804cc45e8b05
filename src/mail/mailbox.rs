//! Per-user mailbox
//!
//! A mailbox owns the user's folder tree, filter rules, urgency queue and a
//! subject index. Root, Inbox and Sent are created with the mailbox and
//! always exist.

use super::{
    FilterEngine, FilterRule, Folder, FolderId, FolderTree, MailOperations, Message, MessageId,
    UrgencyQueue, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the root folder
pub const ROOT_FOLDER: &str = "Root";
/// Name of the default folder for incoming mail
pub const INBOX_FOLDER: &str = "Inbox";
/// Name of the folder holding sent copies
pub const SENT_FOLDER: &str = "Sent";

/// A user's mailbox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mailbox {
    owner: UserId,
    tree: FolderTree,
    inbox: FolderId,
    sent: FolderId,
    filters: FilterEngine,
    urgent: UrgencyQueue,
    /// Subject to most recently seen message
    subjects: HashMap<String, MessageId>,
}

impl Mailbox {
    /// Create a mailbox with the default Root/Inbox/Sent hierarchy
    pub fn new(owner: UserId) -> Self {
        let mut tree = FolderTree::new(ROOT_FOLDER);
        let root = tree.root();
        let inbox = tree.add_child(root, INBOX_FOLDER).unwrap_or(root);
        let sent = tree.add_child(root, SENT_FOLDER).unwrap_or(root);

        Self {
            owner,
            tree,
            inbox,
            sent,
            filters: FilterEngine::new(),
            urgent: UrgencyQueue::new(),
            subjects: HashMap::new(),
        }
    }

    /// Owner of this mailbox
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// The whole folder tree, for rendering
    pub fn tree(&self) -> &FolderTree {
        &self.tree
    }

    /// Root folder id
    pub fn root_id(&self) -> FolderId {
        self.tree.root()
    }

    /// Inbox folder id
    pub fn inbox_id(&self) -> FolderId {
        self.inbox
    }

    /// Sent folder id
    pub fn sent_id(&self) -> FolderId {
        self.sent
    }

    /// Messages in the inbox
    pub fn inbox(&self) -> &[Message] {
        self.folder_messages(self.inbox)
    }

    /// Messages in the sent folder
    pub fn sent(&self) -> &[Message] {
        self.folder_messages(self.sent)
    }

    fn folder_messages(&self, id: FolderId) -> &[Message] {
        self.tree.get(id).map(Folder::messages).unwrap_or_default()
    }

    /// Find a folder anywhere in the tree by name, ignoring case
    pub fn find_folder(&self, name: &str) -> Option<&Folder> {
        let id = self.tree.find_by_name(self.tree.root(), name)?;
        self.tree.get(id)
    }

    /// Create a folder under the folder named `parent`
    ///
    /// Returns `None` if no folder with that name exists.
    pub fn create_folder(&mut self, parent: &str, name: impl Into<String>) -> Option<FolderId> {
        let parent = self.tree.find_by_name(self.tree.root(), parent)?;
        self.tree.add_child(parent, name)
    }

    /// Add or overwrite a filter rule
    pub fn add_filter(&mut self, keyword: &str, folder: &str) -> Option<String> {
        self.filters.add_rule(keyword, folder)
    }

    /// Remove a filter rule
    pub fn remove_filter(&mut self, keyword: &str) -> bool {
        self.filters.remove_rule(keyword)
    }

    /// Active filters in evaluation order
    pub fn filters(&self) -> &[FilterRule] {
        self.filters.rules()
    }

    /// Move the first message with exactly this subject into the named folder
    ///
    /// The target folder is never created; a missing folder or message
    /// yields false.
    pub fn move_message(&mut self, subject: &str, folder: &str) -> bool {
        let root = self.tree.root();
        let Some(target) = self.tree.find_by_name(root, folder) else {
            tracing::debug!(folder, "Move target folder not found");
            return false;
        };
        self.tree.move_message(root, subject, target)
    }

    /// Move a specific message into the named folder
    pub fn move_message_by_id(&mut self, id: &MessageId, folder: &str) -> bool {
        let root = self.tree.root();
        match self.tree.find_by_name(root, folder) {
            Some(target) => self.tree.move_message_by_id(root, id, target),
            None => false,
        }
    }

    /// Messages anywhere in the mailbox whose subject contains `text`
    pub fn search_by_subject(&self, text: &str) -> Vec<&Message> {
        self.tree.search_by_subject(self.tree.root(), text)
    }

    /// Messages anywhere in the mailbox from `sender`
    pub fn search_by_sender(&self, sender: &UserId) -> Vec<&Message> {
        self.tree.search_by_sender(self.tree.root(), sender)
    }

    /// Most recently seen message with this exact subject
    pub fn message_by_subject(&self, subject: &str) -> Option<&Message> {
        let id = self.subjects.get(subject)?;
        self.find_message(id)
    }

    /// Look up a message by id
    pub fn find_message(&self, id: &MessageId) -> Option<&Message> {
        self.tree.find_message(id).map(|(_, m)| m)
    }

    /// Flag or unflag a filed message as urgent
    ///
    /// Keeps the urgency queue in step with the flag. Returns false if the
    /// message is not in this mailbox.
    pub fn set_urgent(&mut self, id: &MessageId, urgent: bool) -> bool {
        if self.tree.for_each_message_mut(id, |m| m.urgent = urgent) == 0 {
            return false;
        }

        if urgent {
            if !self.urgent.contains(id) {
                if let Some((_, message)) = self.tree.find_message(id) {
                    self.urgent.enqueue(message.clone());
                }
            }
        } else {
            self.urgent.remove(id);
        }
        true
    }

    /// Urgent messages, most recent first
    pub fn urgent_queue(&self) -> &UrgencyQueue {
        &self.urgent
    }

    /// Notify about every urgent message and empty the queue
    pub fn process_urgent(&mut self) -> Vec<Message> {
        let owner = self.owner.clone();
        let mut processed = Vec::with_capacity(self.urgent.len());
        self.urgent.process_all(|m| {
            tracing::info!(
                user = %owner,
                to = %m.receiver,
                subject = %m.subject,
                "Urgent message processed"
            );
            processed.push(m.clone());
        });
        processed
    }

    fn index_subject(&mut self, message: &Message) {
        self.subjects.insert(message.subject.clone(), message.id.clone());
    }
}

impl MailOperations for Mailbox {
    fn compose(&mut self, receiver: UserId, subject: &str, body: &str, urgent: bool) -> Message {
        let message = Message::new(self.owner.clone(), receiver, subject, body).with_urgent(urgent);

        self.tree.add_message(self.sent, message.clone());
        if urgent {
            self.urgent.enqueue(message.clone());
        }
        self.index_subject(&message);

        tracing::debug!(
            user = %self.owner,
            to = %message.receiver,
            subject = %message.subject,
            urgent,
            "Composed message"
        );
        message
    }

    fn receive(&mut self, message: Message) -> FolderId {
        self.index_subject(&message);

        let root = self.tree.root();
        if let Some(folder) = self.filters.apply(&message, &mut self.tree, root) {
            return folder;
        }

        tracing::debug!(user = %self.owner, subject = %message.subject, "Filed in inbox");
        self.tree.add_message(self.inbox, message);
        self.inbox
    }

    fn list_messages(&self) -> &[Message] {
        self.inbox()
    }
}
