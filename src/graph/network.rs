//! Mail network
//!
//! The network owns every server and hands out [`ServerId`] handles. Links
//! between servers are undirected: [`Network::connect`] records both ends.
//!
//! # Example
//!
//! ```
//! use mailnet::graph::Network;
//!
//! let mut net = Network::new();
//! let a = net.add_server("serverA");
//! let b = net.add_server("serverB");
//! let c = net.add_server("serverC");
//! net.connect(a, b);
//! net.connect(b, c);
//!
//! let alice = "alice".parse().unwrap();
//! let bob = "bob".parse().unwrap();
//! net.register_user(a, alice).unwrap();
//! net.register_user(c, bob).unwrap();
//!
//! let outcome = net
//!     .send(a, &"alice".parse().unwrap(), "bob".parse().unwrap(), "Hi", "text", false)
//!     .unwrap();
//! assert!(outcome.is_delivered());
//! assert_eq!(outcome.hops(), Some(2));
//! ```

use super::{DeliveryOutcome, MailServer, RouteStrategy, ServerId};
use crate::mail::{MailOperations, Mailbox, UserId};
use crate::{MailnetError, Result};
use std::fmt::Write as _;

/// A set of mail servers and the links between them
#[derive(Debug, Clone, Default)]
pub struct Network {
    servers: Vec<MailServer>,
    strategy: RouteStrategy,
}

impl Network {
    /// Create an empty network routing breadth-first
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different search strategy for [`Network::send`]
    pub fn with_strategy(mut self, strategy: RouteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Change the search strategy for [`Network::send`]
    pub fn set_strategy(&mut self, strategy: RouteStrategy) {
        self.strategy = strategy;
    }

    /// Current search strategy
    pub fn strategy(&self) -> RouteStrategy {
        self.strategy
    }

    /// Add a named server
    pub fn add_server(&mut self, name: impl Into<String>) -> ServerId {
        let id = ServerId::new(self.servers.len());
        let name = name.into();
        tracing::debug!(server = %name, id = id.index(), "Adding server");
        self.servers.push(MailServer::new(id, name));
        id
    }

    /// Add a server named `server-<n>`
    pub fn add_unnamed_server(&mut self) -> ServerId {
        let name = format!("server-{}", self.servers.len() + 1);
        self.add_server(name)
    }

    /// Look up a server by handle
    pub fn server(&self, id: ServerId) -> Option<&MailServer> {
        self.servers.get(id.index())
    }

    /// Look up a server mutably by handle
    pub fn server_mut(&mut self, id: ServerId) -> Option<&mut MailServer> {
        self.servers.get_mut(id.index())
    }

    /// First server with exactly this name
    pub fn server_by_name(&self, name: &str) -> Option<ServerId> {
        self.servers.iter().find(|s| s.name() == name).map(MailServer::id)
    }

    /// All servers in creation order
    pub fn servers(&self) -> &[MailServer] {
        &self.servers
    }

    /// Number of servers
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Check if the network has no servers
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Link two servers in both directions
    ///
    /// Returns false when the link already exists, when both handles are the
    /// same server, or when either handle is unknown.
    pub fn connect(&mut self, a: ServerId, b: ServerId) -> bool {
        if a == b || self.server(a).is_none() || self.server(b).is_none() {
            return false;
        }
        if self.servers[a.index()].is_connected_to(b) {
            return false;
        }

        self.servers[a.index()].add_neighbor(b);
        self.servers[b.index()].add_neighbor(a);
        tracing::debug!(
            a = %self.servers[a.index()].name(),
            b = %self.servers[b.index()].name(),
            "Connected servers"
        );
        true
    }

    /// Every link once, as `(lower, higher)` handle pairs in creation order
    pub fn links(&self) -> Vec<(ServerId, ServerId)> {
        self.servers
            .iter()
            .flat_map(|s| {
                s.neighbors()
                    .iter()
                    .filter(move |n| s.id() < **n)
                    .map(move |n| (s.id(), *n))
            })
            .collect()
    }

    /// Register a user on a server
    ///
    /// `Ok(false)` means the user already exists on that server.
    ///
    /// # Errors
    /// Returns an error if the server handle is unknown.
    pub fn register_user(&mut self, server: ServerId, user: UserId) -> Result<bool> {
        let server = self
            .server_mut(server)
            .ok_or_else(|| MailnetError::UnknownServer(server.to_string()))?;
        Ok(server.register_user(user))
    }

    /// Mailbox of a user on a specific server
    pub fn mailbox(&self, server: ServerId, user: &UserId) -> Option<&Mailbox> {
        self.server(server)?.mailbox(user)
    }

    /// Mutable mailbox of a user on a specific server
    pub fn mailbox_mut(&mut self, server: ServerId, user: &UserId) -> Option<&mut Mailbox> {
        self.server_mut(server)?.mailbox_mut(user)
    }

    /// First server, in creation order, where the user is registered
    pub fn home_of(&self, user: &UserId) -> Option<ServerId> {
        self.servers.iter().find(|s| s.has_user(user)).map(MailServer::id)
    }

    /// Compose a message from `sender` on `origin` and route it to `receiver`
    ///
    /// The sender keeps a copy in Sent (and in the urgency queue when
    /// `urgent`) whatever the outcome. An unreachable receiver is reported as
    /// [`DeliveryOutcome::Unreachable`], not as an error.
    ///
    /// # Errors
    /// Returns an error if `origin` is unknown or `sender` is not registered
    /// on it.
    pub fn send(
        &mut self,
        origin: ServerId,
        sender: &UserId,
        receiver: UserId,
        subject: &str,
        body: &str,
        urgent: bool,
    ) -> Result<DeliveryOutcome> {
        let strategy = self.strategy;
        self.send_with(origin, sender, receiver, subject, body, urgent, strategy)
    }

    /// [`Network::send`] with an explicit search strategy
    #[allow(clippy::too_many_arguments)]
    pub fn send_with(
        &mut self,
        origin: ServerId,
        sender: &UserId,
        receiver: UserId,
        subject: &str,
        body: &str,
        urgent: bool,
        strategy: RouteStrategy,
    ) -> Result<DeliveryOutcome> {
        let server = self
            .server_mut(origin)
            .ok_or_else(|| MailnetError::UnknownServer(origin.to_string()))?;
        let server_name = server.name().to_string();
        let mailbox = server
            .mailbox_mut(sender)
            .ok_or_else(|| MailnetError::UnknownUser {
                server: server_name,
                user: sender.to_string(),
            })?;

        let message = mailbox.compose(receiver, subject, body, urgent);
        Ok(self.route(origin, message, strategy))
    }

    /// Outline of every server, its users and their folder trees
    pub fn render_structure(&self) -> String {
        let mut out = String::new();
        for server in &self.servers {
            let _ = writeln!(out, "Server: {}", server.name());
            for mailbox in server.mailboxes() {
                let _ = writeln!(out, "User: {}", mailbox.owner());
                out.push_str(&mailbox.tree().render(mailbox.root_id()));
                let _ = writeln!(out, "{}", "-".repeat(40));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        id.parse().unwrap()
    }

    #[test]
    fn test_add_servers() {
        let mut net = Network::new();
        let a = net.add_server("serverA");
        let unnamed = net.add_unnamed_server();

        assert_eq!(net.len(), 2);
        assert_eq!(net.server(a).unwrap().name(), "serverA");
        assert_eq!(net.server(unnamed).unwrap().name(), "server-2");
        assert_eq!(net.server_by_name("serverA"), Some(a));
        assert_eq!(net.server_by_name("servera"), None);
    }

    #[test]
    fn test_connect_is_bidirectional_and_idempotent() {
        let mut net = Network::new();
        let a = net.add_server("a");
        let b = net.add_server("b");

        assert!(net.connect(a, b));
        assert!(!net.connect(a, b));
        assert!(!net.connect(b, a));
        assert!(net.server(a).unwrap().is_connected_to(b));
        assert!(net.server(b).unwrap().is_connected_to(a));
        assert_eq!(net.links(), vec![(a, b)]);
    }

    #[test]
    fn test_connect_rejects_self_and_unknown() {
        let mut net = Network::new();
        let a = net.add_server("a");
        assert!(!net.connect(a, a));
        assert!(!net.connect(a, ServerId::new(9)));
        assert!(net.links().is_empty());
    }

    #[test]
    fn test_register_user() {
        let mut net = Network::new();
        let a = net.add_server("a");

        assert!(net.register_user(a, user("alice")).unwrap());
        assert!(!net.register_user(a, user("alice")).unwrap());
        assert!(matches!(
            net.register_user(ServerId::new(5), user("bob")),
            Err(MailnetError::UnknownServer(_))
        ));
        assert_eq!(net.home_of(&user("alice")), Some(a));
        assert_eq!(net.home_of(&user("bob")), None);
    }

    #[test]
    fn test_send_from_unknown_sender() {
        let mut net = Network::new();
        let a = net.add_server("a");

        let result = net.send(a, &user("ghost"), user("bob"), "Hi", "", false);
        assert!(matches!(result, Err(MailnetError::UnknownUser { .. })));

        let result = net.send(ServerId::new(3), &user("ghost"), user("bob"), "Hi", "", false);
        assert!(matches!(result, Err(MailnetError::UnknownServer(_))));
    }

    #[test]
    fn test_send_local() {
        let mut net = Network::new();
        let a = net.add_server("a");
        net.register_user(a, user("alice")).unwrap();
        net.register_user(a, user("bob")).unwrap();

        let outcome = net.send(a, &user("alice"), user("bob"), "Hi", "", false).unwrap();
        assert_eq!(outcome.hops(), Some(0));
        assert_eq!(net.mailbox(a, &user("bob")).unwrap().inbox().len(), 1);
        assert_eq!(net.mailbox(a, &user("alice")).unwrap().sent().len(), 1);
    }

    #[test]
    fn test_send_with_overrides_strategy() {
        let mut net = Network::new();
        let a = net.add_server("a");
        let b = net.add_server("b");
        let c = net.add_server("c");
        net.connect(a, b);
        net.connect(b, c);
        net.connect(a, c);
        net.register_user(a, user("alice")).unwrap();
        net.register_user(c, user("carl")).unwrap();

        // a's first link is b, so depth-first goes the long way round
        let outcome = net
            .send_with(a, &user("alice"), user("carl"), "Hi", "", false, RouteStrategy::DepthFirst)
            .unwrap();
        assert_eq!(outcome.hops(), Some(2));
        assert_eq!(net.strategy(), RouteStrategy::BreadthFirst);

        let outcome = net.send(a, &user("alice"), user("carl"), "Hi", "", false).unwrap();
        assert_eq!(outcome.hops(), Some(1));
    }

    #[test]
    fn test_render_structure() {
        let mut net = Network::new();
        let a = net.add_server("serverA");
        net.register_user(a, user("alice")).unwrap();

        let text = net.render_structure();
        assert!(text.starts_with("Server: serverA\nUser: alice\nRoot (0 messages)\n"));
        assert!(text.contains("  Inbox (0 messages)"));
        assert!(text.contains(&"-".repeat(40)));
    }
}
