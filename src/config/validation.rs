//! Configuration validation
//!
//! Validates a network configuration for correctness:
//! - At least one server, with unique non-empty names
//! - Well-formed user ids, unique per server
//! - Links, filters and script entries refer to known servers and users

use super::network_config::NetworkConfig;
use crate::mail::UserId;
use std::collections::{HashMap, HashSet};

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub context: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref ctx) = self.context {
            write!(f, "[{}] {}: {}", ctx, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a network configuration
pub fn validate_config(config: &NetworkConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::new(
            "servers",
            "At least one server must be defined",
        ));
    }

    // Server name -> registered users
    let mut users_by_server: HashMap<&str, HashSet<&str>> = HashMap::new();

    for (i, server) in config.servers.iter().enumerate() {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("servers[{}].name", i),
                "Server name cannot be empty",
            ));
            continue;
        }

        if users_by_server.contains_key(server.name.as_str()) {
            errors.push(ValidationError::new(
                "servers",
                format!("Duplicate server name: {}", server.name),
            ));
            continue;
        }

        let mut users = HashSet::new();
        for user in &server.users {
            if let Err(e) = UserId::new(user.as_str()) {
                errors.push(
                    ValidationError::new("users", format!("'{}': {}", user, e))
                        .with_context(&server.name),
                );
            } else if !users.insert(user.as_str()) {
                errors.push(
                    ValidationError::new("users", format!("Duplicate user: {}", user))
                        .with_context(&server.name),
                );
            }
        }
        users_by_server.insert(server.name.as_str(), users);
    }

    let mut seen_links = HashSet::new();
    for [a, b] in &config.links {
        for end in [a, b] {
            if !users_by_server.contains_key(end.as_str()) {
                errors.push(ValidationError::new(
                    "links",
                    format!("Unknown server '{}' in link {} - {}", end, a, b),
                ));
            }
        }
        if a == b {
            errors.push(ValidationError::new(
                "links",
                format!("Server '{}' cannot be linked to itself", a),
            ));
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        if !seen_links.insert(key) {
            errors.push(ValidationError::new(
                "links",
                format!("Duplicate link: {} - {}", a, b),
            ));
        }
    }

    for (i, filter) in config.filters.iter().enumerate() {
        let field = format!("filters[{}]", i);
        check_user(&users_by_server, &filter.server, &filter.user, &field, &mut errors);

        if filter.keyword.trim().is_empty() {
            errors.push(ValidationError::new(&field, "Keyword cannot be empty"));
        }
        if filter.folder.trim().is_empty() {
            errors.push(ValidationError::new(&field, "Folder name cannot be empty"));
        }
    }

    for (i, entry) in config.script.iter().enumerate() {
        let field = format!("script[{}]", i);
        check_user(&users_by_server, &entry.server, &entry.from, &field, &mut errors);

        if let Err(e) = UserId::new(entry.to.as_str()) {
            errors.push(ValidationError::new(
                &field,
                format!("Invalid receiver '{}': {}", entry.to, e),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that `user` is registered on `server`
fn check_user(
    users_by_server: &HashMap<&str, HashSet<&str>>,
    server: &str,
    user: &str,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    match users_by_server.get(server) {
        None => errors.push(ValidationError::new(
            field,
            format!("Unknown server: {}", server),
        )),
        Some(users) if !users.contains(user) => errors.push(
            ValidationError::new(field, format!("User '{}' is not registered here", user))
                .with_context(server),
        ),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, ServerConfig};

    #[test]
    fn test_valid_config() {
        let config = NetworkConfig::sample();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_servers() {
        let config = NetworkConfig::new();
        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(errors) = result {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].message.contains("At least one server"));
        }
    }

    #[test]
    fn test_duplicate_server_names() {
        let mut config = NetworkConfig::new();
        config.servers.push(ServerConfig::new("serverA", &[]));
        config.servers.push(ServerConfig::new("serverA", &[]));

        let result = validate_config(&config);
        if let Err(errors) = result {
            assert!(errors[0].message.contains("Duplicate server name"));
        } else {
            panic!("duplicate server names accepted");
        }
    }

    #[test]
    fn test_invalid_and_duplicate_users() {
        let mut config = NetworkConfig::new();
        config
            .servers
            .push(ServerConfig::new("serverA", &["alice", "alice", "bad user"]));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.context.as_deref() == Some("serverA")));
        assert!(errors.iter().any(|e| e.message.contains("Duplicate user")));
        assert!(errors.iter().any(|e| e.message.contains("bad user")));
    }

    #[test]
    fn test_bad_links() {
        let mut config = NetworkConfig::new();
        config.servers.push(ServerConfig::new("a", &[]));
        config.servers.push(ServerConfig::new("b", &[]));
        config.links.push(["a".to_string(), "a".to_string()]);
        config.links.push(["a".to_string(), "b".to_string()]);
        config.links.push(["b".to_string(), "a".to_string()]);
        config.links.push(["a".to_string(), "zz".to_string()]);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].message.contains("linked to itself"));
        assert!(errors[1].message.contains("Duplicate link"));
        assert!(errors[2].message.contains("Unknown server 'zz'"));
    }

    #[test]
    fn test_filter_for_unregistered_user() {
        let mut config = NetworkConfig::sample();
        config.filters.push(FilterConfig {
            server: "serverA".to_string(),
            user: "bob".to_string(),
            keyword: "".to_string(),
            folder: "Finance".to_string(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "[serverA] filters[1]: User 'bob' is not registered here"
        );
        assert_eq!(errors[1].to_string(), "filters[1]: Keyword cannot be empty");
    }

    #[test]
    fn test_script_sender_must_be_registered() {
        let mut config = NetworkConfig::sample();
        config.script[0].from = "bob".to_string();
        config.script[1].to = "".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].field == "script[0]");
        assert!(errors[1].message.contains("Invalid receiver"));
    }
}
