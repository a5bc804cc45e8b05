//! Keyword filters
//!
//! Rules are kept in registration order and the first keyword found in a
//! message's subject or body decides its folder. Keywords are matched
//! case-insensitively and are unique: re-adding a keyword overwrites its
//! target folder in place.

use super::{FolderId, FolderTree, Message};
use serde::{Deserialize, Serialize};

/// A keyword to folder routing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Lowercased keyword
    pub keyword: String,

    /// Name of the folder matching messages are filed into
    pub folder: String,
}

impl FilterRule {
    /// Create a rule, normalizing the keyword to lowercase
    pub fn new(keyword: impl AsRef<str>, folder: impl Into<String>) -> Self {
        Self {
            keyword: keyword.as_ref().to_lowercase(),
            folder: folder.into(),
        }
    }

    /// Check the rule against already-lowercased text
    fn matches(&self, text: &str) -> bool {
        text.contains(&self.keyword)
    }
}

/// Ordered set of filter rules for one mailbox
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterEngine {
    rules: Vec<FilterRule>,
}

impl FilterEngine {
    /// Create an engine with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the rule for `keyword`
    ///
    /// Returns the previous target folder when the keyword was already
    /// registered. An overwritten rule keeps its original position.
    pub fn add_rule(&mut self, keyword: impl AsRef<str>, folder: impl Into<String>) -> Option<String> {
        let rule = FilterRule::new(keyword, folder);

        if let Some(existing) = self.rules.iter_mut().find(|r| r.keyword == rule.keyword) {
            tracing::debug!(keyword = %rule.keyword, folder = %rule.folder, "Overwriting filter");
            return Some(std::mem::replace(&mut existing.folder, rule.folder));
        }

        tracing::debug!(keyword = %rule.keyword, folder = %rule.folder, "Adding filter");
        self.rules.push(rule);
        None
    }

    /// Remove the rule for `keyword`
    pub fn remove_rule(&mut self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        let before = self.rules.len();
        self.rules.retain(|r| r.keyword != keyword);
        self.rules.len() != before
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule whose keyword occurs in the message subject or body
    pub fn matching_rule(&self, message: &Message) -> Option<&FilterRule> {
        let text = message.searchable_text();
        self.rules.iter().find(|r| r.matches(&text))
    }

    /// File `message` into the folder of the first matching rule
    ///
    /// The target folder is looked up by name under `root`, ignoring case,
    /// and created as a direct child of `root` if missing. Returns `None`
    /// without touching the tree when no rule matches; the caller decides
    /// where unmatched mail goes.
    pub fn apply(
        &self,
        message: &Message,
        tree: &mut FolderTree,
        root: FolderId,
    ) -> Option<FolderId> {
        let rule = self.matching_rule(message)?;

        let folder = match tree.find_by_name(root, &rule.folder) {
            Some(existing) => existing,
            None => tree.add_child(root, rule.folder.clone())?,
        };

        tracing::debug!(
            keyword = %rule.keyword,
            folder = %rule.folder,
            subject = %message.subject,
            "Filter matched"
        );
        tree.add_message(folder, message.clone());
        Some(folder)
    }
}
