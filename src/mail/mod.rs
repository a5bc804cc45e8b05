//! Mail organization
//!
//! Messages, per-user folder trees, keyword filters and the urgency queue.
//!
//! # Overview
//!
//! Each registered user owns a [`Mailbox`]:
//! - **Folder tree** rooted at `Root`, with `Inbox` and `Sent` always present
//! - **Filters** that file incoming mail by keyword before it reaches `Inbox`
//! - **Urgency queue** of urgent sent mail, most recent first
//!
//! # Example
//!
//! ```
//! use mailnet::mail::{MailOperations, Mailbox, UserId};
//!
//! let alice: UserId = "alice".parse().unwrap();
//! let mut bob = Mailbox::new("bob".parse().unwrap());
//! bob.add_filter("invoice", "Finance");
//!
//! let mut outgoing = Mailbox::new(alice);
//! let msg = outgoing.compose(bob.owner().clone(), "Invoice #2", "Due Friday", false);
//! bob.receive(msg);
//!
//! assert!(bob.inbox().is_empty());
//! assert_eq!(bob.find_folder("Finance").unwrap().messages().len(), 1);
//! ```

mod address;
mod filter;
mod folder;
mod mailbox;
mod message;
mod operations;
mod urgency;

pub use address::{AddressError, UserId};
pub use filter::{FilterEngine, FilterRule};
pub use folder::{Folder, FolderId, FolderTree};
pub use mailbox::{Mailbox, INBOX_FOLDER, ROOT_FOLDER, SENT_FOLDER};
pub use message::{Message, MessageId};
pub use operations::MailOperations;
pub use urgency::UrgencyQueue;
