//! Type-safe handle for servers in a network

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a server inside its [`Network`](super::Network)
///
/// Servers are never removed, so a handle stays valid for the lifetime of
/// the network that issued it. Handles from one network mean nothing in
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerId(usize);

impl ServerId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the server in its network
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server#{}", self.0)
    }
}
