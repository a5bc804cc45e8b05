//! Folder tree
//!
//! Each mailbox keeps its folders in a flat arena. Parent and child links are
//! [`FolderId`] indices into that arena, so the parent back-reference never
//! owns anything. Folders are never removed, which keeps every id valid for
//! the lifetime of the tree.
//!
//! All searches walk the tree depth-first in pre-order: a folder's own
//! messages come before those of its children, children in creation order.

use super::{Message, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Index of a folder inside its [`FolderTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(usize);

impl FolderId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A folder holding messages and child folders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    name: String,
    parent: Option<FolderId>,
    children: Vec<FolderId>,
    messages: Vec<Message>,
}

impl Folder {
    fn new(name: impl Into<String>, parent: Option<FolderId>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Folder name as created
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent folder, `None` for the root
    pub fn parent(&self) -> Option<FolderId> {
        self.parent
    }

    /// Child folders in creation order
    pub fn children(&self) -> &[FolderId] {
        &self.children
    }

    /// Messages in arrival order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Case-insensitive name comparison used by every lookup
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Arena-backed folder hierarchy rooted at a single folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    folders: Vec<Folder>,
}

impl FolderTree {
    /// Create a tree containing only the root folder
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            folders: vec![Folder::new(root_name, None)],
        }
    }

    /// The root folder
    pub fn root(&self) -> FolderId {
        FolderId(0)
    }

    /// Look up a folder by id
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(id.0)
    }

    /// Total number of folders, root included
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Always false, the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Attach a new child folder under `parent`
    ///
    /// Sibling names are not checked for duplicates. Returns `None` if
    /// `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: FolderId, name: impl Into<String>) -> Option<FolderId> {
        self.get(parent)?;

        let id = FolderId(self.folders.len());
        let name = name.into();
        tracing::debug!(folder = %name, parent = parent.0, "Creating folder");

        self.folders.push(Folder::new(name, Some(parent)));
        self.folders[parent.0].children.push(id);
        Some(id)
    }

    /// Append a message to a folder
    ///
    /// Returns false if the folder does not belong to this tree.
    pub fn add_message(&mut self, folder: FolderId, message: Message) -> bool {
        match self.folders.get_mut(folder.0) {
            Some(f) => {
                f.messages.push(message);
                true
            }
            None => false,
        }
    }

    /// Folder ids of the subtree under `from`, in pre-order
    pub fn preorder(&self, from: FolderId) -> Vec<FolderId> {
        let mut order = Vec::new();
        if self.get(from).is_none() {
            return order;
        }

        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.folders[id.0].children.iter().rev());
        }
        order
    }

    /// First folder under `from` (inclusive) whose name matches, ignoring case
    pub fn find_by_name(&self, from: FolderId, name: &str) -> Option<FolderId> {
        self.preorder(from)
            .into_iter()
            .find(|id| self.folders[id.0].has_name(name))
    }

    /// Every message under `from` whose subject contains `text`, ignoring case
    pub fn search_by_subject(&self, from: FolderId, text: &str) -> Vec<&Message> {
        self.collect(from, |m| m.subject_contains(text))
    }

    /// Every message under `from` sent by exactly `sender`
    pub fn search_by_sender(&self, from: FolderId, sender: &UserId) -> Vec<&Message> {
        self.collect(from, |m| &m.sender == sender)
    }

    fn collect<F>(&self, from: FolderId, predicate: F) -> Vec<&Message>
    where
        F: Fn(&Message) -> bool,
    {
        self.preorder(from)
            .into_iter()
            .flat_map(|id| self.folders[id.0].messages.iter())
            .filter(|m| predicate(*m))
            .collect()
    }

    /// Move the first message under `from` whose subject equals `subject`
    /// exactly into `target`
    ///
    /// Returns false, leaving the tree untouched, when no such message exists
    /// or `target` is not part of this tree.
    pub fn move_message(&mut self, from: FolderId, subject: &str, target: FolderId) -> bool {
        self.move_first(from, target, |m| m.subject == subject)
    }

    /// Move the message with the given id into `target`
    pub fn move_message_by_id(&mut self, from: FolderId, id: &MessageId, target: FolderId) -> bool {
        self.move_first(from, target, |m| &m.id == id)
    }

    fn move_first<F>(&mut self, from: FolderId, target: FolderId, predicate: F) -> bool
    where
        F: Fn(&Message) -> bool,
    {
        if self.get(target).is_none() {
            return false;
        }

        let Some((source, position)) = self.position_of(from, predicate) else {
            return false;
        };

        let message = self.folders[source.0].messages.remove(position);
        tracing::debug!(
            subject = %message.subject,
            from = %self.folders[source.0].name,
            to = %self.folders[target.0].name,
            "Moving message"
        );
        self.folders[target.0].messages.push(message);
        true
    }

    fn position_of<F>(&self, from: FolderId, predicate: F) -> Option<(FolderId, usize)>
    where
        F: Fn(&Message) -> bool,
    {
        self.preorder(from).into_iter().find_map(|id| {
            self.folders[id.0]
                .messages
                .iter()
                .position(&predicate)
                .map(|pos| (id, pos))
        })
    }

    /// Locate a message anywhere in the tree by id
    pub fn find_message(&self, id: &MessageId) -> Option<(FolderId, &Message)> {
        let (folder, pos) = self.position_of(self.root(), |m| &m.id == id)?;
        Some((folder, &self.folders[folder.0].messages[pos]))
    }

    /// Apply `update` to every copy of a message in the tree
    ///
    /// Self-addressed mail is filed twice under one id. Returns the number
    /// of copies updated.
    pub fn for_each_message_mut<F>(&mut self, id: &MessageId, mut update: F) -> usize
    where
        F: FnMut(&mut Message),
    {
        let mut count = 0;
        for message in self
            .folders
            .iter_mut()
            .flat_map(|f| f.messages.iter_mut())
            .filter(|m| &m.id == id)
        {
            update(message);
            count += 1;
        }
        count
    }

    /// Number of messages under `from`, descendants included
    pub fn message_count(&self, from: FolderId) -> usize {
        self.preorder(from)
            .into_iter()
            .map(|id| self.folders[id.0].messages.len())
            .sum()
    }

    /// Slash-separated path from the root, e.g. `Root/Inbox`
    pub fn path(&self, id: FolderId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let folder = self.get(cur)?;
            names.push(folder.name.as_str());
            current = folder.parent;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Indented outline of the subtree with per-folder message counts
    pub fn render(&self, from: FolderId) -> String {
        let mut out = String::new();
        if self.get(from).is_none() {
            return out;
        }

        let mut stack = vec![(from, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let folder = &self.folders[id.0];
            let _ = writeln!(
                out,
                "{}{} ({} messages)",
                "  ".repeat(depth),
                folder.name,
                folder.messages.len()
            );
            stack.extend(folder.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        out
    }
}
