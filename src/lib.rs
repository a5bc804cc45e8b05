//! Mailnet - an in-memory email network simulation
//!
//! Mail servers are linked into an undirected graph. Each server hosts user
//! mailboxes, and a message sent from one server is routed to whichever
//! reachable server hosts the receiver, found by breadth-first or depth-first
//! search.
//!
//! # Architecture
//!
//! - **mail**: User ids, messages, folder trees, filters, urgency queues and mailboxes
//! - **graph**: Servers, the network and BFS/DFS routing
//! - **config**: YAML network description and validation
//! - **logging**: tracing subscriber setup

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod mail;

// Re-exports
pub use error::{MailnetError, Result};
