//! Delivery routing
//!
//! Finds the server holding a receiver by searching the link graph from the
//! origin server, then hands the message to that server.
//!
//! Two strategies are available:
//! - **Breadth-first**: the first server found is the fewest hops away
//! - **Depth-first**: follows links as deep as possible first; reaches the
//!   same servers, but the route found may be longer
//!
//! Both keep a visited set local to the call, so cyclic topologies are safe
//! and every search ends after at most one visit per server.

use super::{Network, ServerId};
use crate::mail::{FolderId, Message, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

/// Graph search used to locate a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// Fewest hops first
    #[default]
    BreadthFirst,
    /// Deepest path first
    DepthFirst,
}

impl RouteStrategy {
    /// Short name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStrategy::BreadthFirst => "bfs",
            RouteStrategy::DepthFirst => "dfs",
        }
    }
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "bfs" | "breadth_first" => Ok(RouteStrategy::BreadthFirst),
            "dfs" | "depth_first" => Ok(RouteStrategy::DepthFirst),
            other => Err(format!(
                "Invalid strategy '{}'. Must be one of: bfs, dfs",
                other
            )),
        }
    }
}

/// Servers visited from origin to the server holding the receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    path: Vec<ServerId>,
}

impl Route {
    /// Server ids from origin (first) to destination (last)
    pub fn path(&self) -> &[ServerId] {
        &self.path
    }

    /// Server the search started from
    pub fn origin(&self) -> ServerId {
        self.path[0]
    }

    /// Server holding the receiver
    pub fn destination(&self) -> ServerId {
        self.path[self.path.len() - 1]
    }

    /// Number of links crossed
    pub fn hops(&self) -> usize {
        self.path.len() - 1
    }

    fn from_parents(
        origin: ServerId,
        destination: ServerId,
        parents: &HashMap<ServerId, ServerId>,
    ) -> Self {
        let mut path = vec![destination];
        let mut current = destination;
        while current != origin {
            match parents.get(&current) {
                Some(&parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        path.reverse();
        Self { path }
    }
}

/// Final state of a delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The receiver's mailbox accepted the message
    Delivered {
        /// Route the message travelled
        route: Route,
        /// Folder the receiver filed it in
        folder: FolderId,
    },

    /// No reachable server holds the receiver
    Unreachable,
}

impl DeliveryOutcome {
    /// Check if the message reached its receiver
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    /// Route travelled, if delivered
    pub fn route(&self) -> Option<&Route> {
        match self {
            DeliveryOutcome::Delivered { route, .. } => Some(route),
            DeliveryOutcome::Unreachable => None,
        }
    }

    /// Server that accepted the message, if delivered
    pub fn server(&self) -> Option<ServerId> {
        self.route().map(Route::destination)
    }

    /// Links crossed, if delivered
    pub fn hops(&self) -> Option<usize> {
        self.route().map(Route::hops)
    }
}

impl Network {
    /// Find the server holding `receiver`, searching from `origin`
    ///
    /// The origin itself is checked first, so local users are found with
    /// zero hops by either strategy.
    pub fn locate(
        &self,
        origin: ServerId,
        receiver: &UserId,
        strategy: RouteStrategy,
    ) -> Option<Route> {
        self.server(origin)?;

        match strategy {
            RouteStrategy::BreadthFirst => self.locate_breadth_first(origin, receiver),
            RouteStrategy::DepthFirst => self.locate_depth_first(origin, receiver),
        }
    }

    fn locate_breadth_first(&self, origin: ServerId, receiver: &UserId) -> Option<Route> {
        let mut visited = HashSet::from([origin]);
        let mut parents: HashMap<ServerId, ServerId> = HashMap::new();
        let mut frontier = VecDeque::from([origin]);

        while let Some(current) = frontier.pop_front() {
            let Some(server) = self.server(current) else {
                continue;
            };
            tracing::trace!(server = %server.name(), "Visiting server breadth-first");

            if server.has_user(receiver) {
                return Some(Route::from_parents(origin, current, &parents));
            }

            for &next in server.neighbors() {
                if visited.insert(next) {
                    parents.insert(next, current);
                    frontier.push_back(next);
                }
            }
        }
        None
    }

    fn locate_depth_first(&self, origin: ServerId, receiver: &UserId) -> Option<Route> {
        if self.visit_depth_first(origin, receiver) {
            return Some(Route { path: vec![origin] });
        }

        let mut visited = HashSet::from([origin]);
        // Current path, each entry with the index of its next neighbor to try
        let mut stack = vec![(origin, 0usize)];

        while let Some(&(current, next)) = stack.last() {
            let Some(candidate) = self.neighbor_at(current, next) else {
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            if !visited.insert(candidate) {
                continue;
            }

            if self.visit_depth_first(candidate, receiver) {
                let mut path: Vec<ServerId> = stack.iter().map(|(id, _)| *id).collect();
                path.push(candidate);
                return Some(Route { path });
            }
            stack.push((candidate, 0));
        }
        None
    }

    /// Check one server during a depth-first search
    fn visit_depth_first(&self, id: ServerId, receiver: &UserId) -> bool {
        self.server(id).is_some_and(|server| {
            tracing::trace!(server = %server.name(), "Visiting server depth-first");
            server.has_user(receiver)
        })
    }

    fn neighbor_at(&self, id: ServerId, index: usize) -> Option<ServerId> {
        self.server(id)?.neighbors().get(index).copied()
    }

    /// Every server reachable from `origin`, in visiting order
    ///
    /// Exhaustive: the whole connected component is traversed.
    pub fn reachable(&self, origin: ServerId, strategy: RouteStrategy) -> Vec<ServerId> {
        let mut order = Vec::new();
        if self.server(origin).is_none() {
            return order;
        }

        let mut visited = HashSet::from([origin]);
        match strategy {
            RouteStrategy::BreadthFirst => {
                let mut frontier = VecDeque::from([origin]);
                while let Some(current) = frontier.pop_front() {
                    order.push(current);
                    for &next in self.servers()[current.index()].neighbors() {
                        if visited.insert(next) {
                            frontier.push_back(next);
                        }
                    }
                }
            }
            RouteStrategy::DepthFirst => {
                order.push(origin);
                let mut stack = vec![(origin, 0usize)];
                while let Some(&(current, next)) = stack.last() {
                    let Some(candidate) = self.neighbor_at(current, next) else {
                        stack.pop();
                        continue;
                    };
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    if visited.insert(candidate) {
                        order.push(candidate);
                        stack.push((candidate, 0));
                    }
                }
            }
        }
        order
    }

    /// Route an already-composed message from `origin` to its receiver
    pub fn route(
        &mut self,
        origin: ServerId,
        message: Message,
        strategy: RouteStrategy,
    ) -> DeliveryOutcome {
        let Some(route) = self.locate(origin, &message.receiver, strategy) else {
            tracing::warn!(
                origin = %origin,
                receiver = %message.receiver,
                strategy = %strategy,
                "Receiver unreachable"
            );
            return DeliveryOutcome::Unreachable;
        };

        let Some(server) = self.server_mut(route.destination()) else {
            return DeliveryOutcome::Unreachable;
        };

        match server.deliver(message) {
            Some(folder) => {
                tracing::debug!(hops = route.hops(), strategy = %strategy, "Delivered");
                DeliveryOutcome::Delivered { route, folder }
            }
            None => DeliveryOutcome::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailOperations;

    fn user(id: &str) -> UserId {
        id.parse().unwrap()
    }

    /// Ring a-b-c-d-e-a, receiver on d
    fn ring() -> (Network, Vec<ServerId>) {
        let mut net = Network::new();
        let ids: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| net.add_server(*n))
            .collect();
        for i in 0..ids.len() {
            net.connect(ids[i], ids[(i + 1) % ids.len()]);
        }
        net.register_user(ids[3], user("dora")).unwrap();
        (net, ids)
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("bfs".parse::<RouteStrategy>(), Ok(RouteStrategy::BreadthFirst));
        assert_eq!("Depth-First".parse::<RouteStrategy>(), Ok(RouteStrategy::DepthFirst));
        assert!("astar".parse::<RouteStrategy>().is_err());
        assert_eq!(RouteStrategy::default(), RouteStrategy::BreadthFirst);
    }

    #[test]
    fn test_breadth_first_finds_fewest_hops() {
        let (net, ids) = ring();
        let route = net
            .locate(ids[0], &user("dora"), RouteStrategy::BreadthFirst)
            .unwrap();

        // a-e-d is shorter than a-b-c-d
        assert_eq!(route.path(), &[ids[0], ids[4], ids[3]]);
        assert_eq!(route.hops(), 2);
        assert_eq!(route.origin(), ids[0]);
        assert_eq!(route.destination(), ids[3]);
    }

    #[test]
    fn test_depth_first_follows_first_link() {
        let (net, ids) = ring();
        let route = net
            .locate(ids[0], &user("dora"), RouteStrategy::DepthFirst)
            .unwrap();

        assert_eq!(route.path(), &[ids[0], ids[1], ids[2], ids[3]]);
        assert_eq!(route.hops(), 3);
    }

    #[test]
    fn test_local_receiver_has_zero_hops() {
        let (net, ids) = ring();
        for strategy in [RouteStrategy::BreadthFirst, RouteStrategy::DepthFirst] {
            let route = net.locate(ids[3], &user("dora"), strategy).unwrap();
            assert_eq!(route.hops(), 0);
        }
    }

    #[test]
    fn test_unknown_receiver_terminates_on_cycle() {
        let (net, ids) = ring();
        assert!(net.locate(ids[0], &user("nobody"), RouteStrategy::BreadthFirst).is_none());
        assert!(net.locate(ids[0], &user("nobody"), RouteStrategy::DepthFirst).is_none());
    }

    #[test]
    fn test_unknown_origin() {
        let (net, _) = ring();
        assert!(net
            .locate(ServerId::new(42), &user("dora"), RouteStrategy::BreadthFirst)
            .is_none());
        assert!(net.reachable(ServerId::new(42), RouteStrategy::DepthFirst).is_empty());
    }

    #[test]
    fn test_strategies_agree_on_outcome() {
        let mut net = Network::new();
        let a = net.add_server("a");
        let b = net.add_server("b");
        let c = net.add_server("c");
        let island = net.add_server("island");
        net.connect(a, b);
        net.connect(b, c);
        net.connect(c, a);
        net.register_user(c, user("bob")).unwrap();
        net.register_user(island, user("carol")).unwrap();

        for receiver in ["bob", "carol", "nobody"] {
            for origin in [a, b, c, island] {
                let bfs = net.locate(origin, &user(receiver), RouteStrategy::BreadthFirst);
                let dfs = net.locate(origin, &user(receiver), RouteStrategy::DepthFirst);
                assert_eq!(bfs.is_some(), dfs.is_some(), "{} from {}", receiver, origin);
            }
        }
    }

    #[test]
    fn test_long_chain_does_not_exhaust_stack() {
        let mut net = Network::new();
        let ids: Vec<_> = (0..10_000).map(|_| net.add_unnamed_server()).collect();
        for pair in ids.windows(2) {
            net.connect(pair[0], pair[1]);
        }
        net.register_user(ids[9_999], user("zoe")).unwrap();

        let bfs = net.locate(ids[0], &user("zoe"), RouteStrategy::BreadthFirst).unwrap();
        let dfs = net.locate(ids[0], &user("zoe"), RouteStrategy::DepthFirst).unwrap();
        assert_eq!(bfs.hops(), 9_999);
        assert_eq!(dfs.path(), bfs.path());

        assert!(net.locate(ids[0], &user("nobody"), RouteStrategy::DepthFirst).is_none());
        assert_eq!(net.reachable(ids[0], RouteStrategy::DepthFirst), ids);
    }

    #[test]
    fn test_reachable_orders() {
        let (net, ids) = ring();
        let bfs = net.reachable(ids[0], RouteStrategy::BreadthFirst);
        let dfs = net.reachable(ids[0], RouteStrategy::DepthFirst);

        assert_eq!(bfs, vec![ids[0], ids[1], ids[4], ids[2], ids[3]]);
        assert_eq!(dfs, vec![ids[0], ids[1], ids[2], ids[3], ids[4]]);
    }

    #[test]
    fn test_route_delivers_and_reports_folder() {
        let (mut net, ids) = ring();
        net.mailbox_mut(ids[3], &user("dora"))
            .unwrap()
            .add_filter("urgent", "Priority");

        let msg = Message::new(user("eve"), user("dora"), "Urgent fix", "");
        let outcome = net.route(ids[1], msg, RouteStrategy::BreadthFirst);

        let DeliveryOutcome::Delivered { route, folder } = &outcome else {
            panic!("expected delivery, got {:?}", outcome);
        };
        assert_eq!(route.hops(), 2);
        let dora = net.mailbox(ids[3], &user("dora")).unwrap();
        assert_eq!(dora.tree().get(*folder).unwrap().name(), "Priority");
        assert!(dora.list_messages().is_empty());
    }

    #[test]
    fn test_route_unreachable() {
        let (mut net, ids) = ring();
        let msg = Message::new(user("eve"), user("nobody"), "Hello?", "");
        let outcome = net.route(ids[0], msg, RouteStrategy::DepthFirst);
        assert_eq!(outcome, DeliveryOutcome::Unreachable);
        assert!(!outcome.is_delivered());
        assert_eq!(outcome.hops(), None);
    }
}
