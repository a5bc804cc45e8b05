//! Delivery graph
//!
//! Defines the mail server nodes, the network that links them, and the
//! breadth-first and depth-first searches used to route messages.

mod ids;
mod network;
mod routing;
mod server;

pub use ids::ServerId;
pub use network::Network;
pub use routing::{DeliveryOutcome, Route, RouteStrategy};
pub use server::MailServer;
