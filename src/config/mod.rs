//! Configuration system
//!
//! Loads ~/.config/mailnet/network.yaml describing:
//! - Servers and the users registered on each
//! - Links between servers
//! - Per-user filter rules
//! - The routing strategy
//! - A script of messages to send

mod network_config;
pub mod validation;

pub use network_config::{
    FilterConfig, NetworkConfig, RoutingConfig, ScriptedMessage, ServerConfig,
};
pub use validation::{validate_config, ValidationError};
