//! Network configuration file handling
//!
//! Loads and saves the ~/.config/mailnet/network.yaml file and turns it into
//! a live [`Network`].

use super::validation::validate_config;
use crate::graph::{DeliveryOutcome, Network, RouteStrategy};
use crate::mail::UserId;
use crate::{MailnetError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A server and the users registered on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Unique server name
    pub name: String,

    /// User ids registered on this server
    #[serde(default)]
    pub users: Vec<String>,
}

impl ServerConfig {
    /// Create a server entry
    pub fn new(name: impl Into<String>, users: &[&str]) -> Self {
        Self {
            name: name.into(),
            users: users.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A filter rule for one user's mailbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Server the user is registered on
    pub server: String,

    /// Mailbox owner
    pub user: String,

    /// Keyword searched in subject and body
    pub keyword: String,

    /// Folder matching mail is filed into
    pub folder: String,
}

/// Routing settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Search used to locate receivers (breadth_first, depth_first)
    #[serde(default)]
    pub strategy: RouteStrategy,
}

/// A message sent by the `simulate` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedMessage {
    /// Server the sender is registered on
    pub server: String,

    /// Sender user id
    pub from: String,

    /// Receiver user id
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Message body
    #[serde(default)]
    pub body: String,

    /// Queue as urgent on the sender side
    #[serde(default)]
    pub urgent: bool,
}

impl ScriptedMessage {
    /// Send this message through `network`
    ///
    /// # Errors
    /// Returns an error if the server is unknown, either user id is
    /// malformed, or the sender is not registered on the server.
    pub fn send(&self, network: &mut Network) -> Result<DeliveryOutcome> {
        let origin = network
            .server_by_name(&self.server)
            .ok_or_else(|| MailnetError::UnknownServer(self.server.clone()))?;
        let sender: UserId = self.from.parse()?;
        let receiver: UserId = self.to.parse()?;

        network.send(origin, &sender, receiver, &self.subject, &self.body, self.urgent)
    }
}

/// Mailnet configuration
///
/// Represents the complete network.yaml file: topology, filters, routing
/// settings and the message script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Servers in creation order
    pub servers: Vec<ServerConfig>,

    /// Undirected links as pairs of server names
    #[serde(default)]
    pub links: Vec<[String; 2]>,

    /// Filter rules
    #[serde(default)]
    pub filters: Vec<FilterConfig>,

    /// Routing settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Messages sent by `simulate`
    #[serde(default)]
    pub script: Vec<ScriptedMessage>,
}

impl NetworkConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Three linked servers plus an isolated fourth, with a filter and a short script
    pub fn sample() -> Self {
        Self {
            servers: vec![
                ServerConfig::new("serverA", &["alice"]),
                ServerConfig::new("serverB", &[]),
                ServerConfig::new("serverC", &["bob"]),
                ServerConfig::new("serverD", &["carol"]),
            ],
            links: vec![
                ["serverA".to_string(), "serverB".to_string()],
                ["serverB".to_string(), "serverC".to_string()],
            ],
            filters: vec![FilterConfig {
                server: "serverC".to_string(),
                user: "bob".to_string(),
                keyword: "invoice".to_string(),
                folder: "Finance".to_string(),
            }],
            routing: RoutingConfig::default(),
            script: vec![
                ScriptedMessage {
                    server: "serverA".to_string(),
                    from: "alice".to_string(),
                    to: "bob".to_string(),
                    subject: "Hi".to_string(),
                    body: "How are you?".to_string(),
                    urgent: false,
                },
                ScriptedMessage {
                    server: "serverA".to_string(),
                    from: "alice".to_string(),
                    to: "bob".to_string(),
                    subject: "Invoice #2".to_string(),
                    body: "Due Friday".to_string(),
                    urgent: true,
                },
                ScriptedMessage {
                    server: "serverA".to_string(),
                    from: "alice".to_string(),
                    to: "carol".to_string(),
                    subject: "Anyone there?".to_string(),
                    body: String::new(),
                    urgent: false,
                },
            ],
        }
    }

    /// Load configuration from the default path (~/.config/mailnet/network.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MailnetError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading network configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            servers = config.servers.len(),
            links = config.links.len(),
            filters = config.filters.len(),
            script = config.script.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving network configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/mailnet/network.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("mailnet");
        path.push("network.yaml");
        path
    }

    /// Get a server entry by name
    pub fn get_server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Validate and build the described network
    ///
    /// The script is not run; see [`ScriptedMessage::send`].
    ///
    /// # Errors
    /// Returns [`MailnetError::Validation`] listing every problem found.
    pub fn build_network(&self) -> Result<Network> {
        validate_config(self).map_err(MailnetError::Validation)?;

        let mut network = Network::new().with_strategy(self.routing.strategy);

        for server in &self.servers {
            let id = network.add_server(server.name.clone());
            for user in &server.users {
                network.register_user(id, user.parse()?)?;
            }
        }

        for [a, b] in &self.links {
            let (Some(a), Some(b)) = (network.server_by_name(a), network.server_by_name(b)) else {
                continue;
            };
            network.connect(a, b);
        }

        for filter in &self.filters {
            let server = network
                .server_by_name(&filter.server)
                .ok_or_else(|| MailnetError::UnknownServer(filter.server.clone()))?;
            let user: UserId = filter.user.parse()?;
            let mailbox = network
                .mailbox_mut(server, &user)
                .ok_or_else(|| MailnetError::UnknownUser {
                    server: filter.server.clone(),
                    user: filter.user.clone(),
                })?;
            mailbox.add_filter(&filter.keyword, &filter.folder);
        }

        tracing::info!(
            servers = network.len(),
            strategy = %network.strategy(),
            "Network built from configuration"
        );
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_builds() {
        let network = NetworkConfig::sample().build_network().unwrap();
        assert_eq!(network.len(), 4);
        assert_eq!(network.links().len(), 2);

        let d = network.server_by_name("serverD").unwrap();
        assert!(network.server(d).unwrap().neighbors().is_empty());

        let c = network.server_by_name("serverC").unwrap();
        let bob = network.mailbox(c, &"bob".parse().unwrap()).unwrap();
        assert_eq!(bob.filters().len(), 1);
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = r#"
servers:
  - name: serverA
    users: [alice]
  - name: serverB
links:
  - [serverA, serverB]
routing:
  strategy: depth_first
"#;
        let config: NetworkConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.servers[1].users.len(), 0);
        assert_eq!(config.links[0], ["serverA".to_string(), "serverB".to_string()]);
        assert_eq!(config.routing.strategy, RouteStrategy::DepthFirst);
        assert!(config.filters.is_empty());
        assert!(config.script.is_empty());
    }

    #[test]
    fn test_build_rejects_invalid() {
        let mut config = NetworkConfig::sample();
        config.links.push(["serverA".to_string(), "nowhere".to_string()]);

        let err = config.build_network().unwrap_err();
        assert!(matches!(err, MailnetError::Validation(_)));
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_scripted_message_send() {
        let config = NetworkConfig::sample();
        let mut network = config.build_network().unwrap();

        let outcomes: Vec<_> = config
            .script
            .iter()
            .map(|m| m.send(&mut network).unwrap())
            .collect();

        assert!(outcomes[0].is_delivered());
        assert!(outcomes[1].is_delivered());
        // carol's server is not linked to anything
        assert!(!outcomes[2].is_delivered());
    }

    #[test]
    fn test_scripted_message_unknown_server() {
        let mut network = NetworkConfig::sample().build_network().unwrap();
        let msg = ScriptedMessage {
            server: "serverZ".to_string(),
            from: "alice".to_string(),
            to: "bob".to_string(),
            subject: "Hi".to_string(),
            body: String::new(),
            urgent: false,
        };
        assert!(matches!(
            msg.send(&mut network),
            Err(MailnetError::UnknownServer(_))
        ));
    }
}
