//! Mailnet - email network simulation
//!
//! Main entry point for the mailnet CLI.

mod commands;

use clap::Parser;
use commands::{Cli, Commands};
use mailnet::config::{validate_config, NetworkConfig, ScriptedMessage};
use mailnet::graph::{DeliveryOutcome, Network, Route, RouteStrategy, ServerId};
use mailnet::mail::{Message, UserId};
use mailnet::MailnetError;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

fn main() {
    if let Err(e) = mailnet::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> mailnet::Result<()> {
    match cli.command {
        Commands::Init { force } => handle_init_command(&cli.config, force),
        Commands::Check => handle_check_command(&load_config(&cli.config)?),
        Commands::Topology => handle_topology_command(&load_config(&cli.config)?),
        Commands::Route { from, to, strategy } => {
            handle_route_command(&load_config(&cli.config)?, &from, &to, strategy)
        }
        Commands::Simulate { strategy, json } => {
            handle_simulate_command(&load_config(&cli.config)?, strategy, json)
        }
    }
}

fn config_path(config_path: &Option<String>) -> PathBuf {
    config_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(NetworkConfig::default_path)
}

fn load_config(path: &Option<String>) -> mailnet::Result<NetworkConfig> {
    match NetworkConfig::load(config_path(path)) {
        Err(MailnetError::Config(msg)) if msg.contains("Config file not found") => {
            Err(MailnetError::Config(format!(
                "{}\n\nRun 'mailnet init' first to create a sample network.",
                msg
            )))
        }
        other => other,
    }
}

fn handle_init_command(path: &Option<String>, force: bool) -> mailnet::Result<()> {
    let config_file = config_path(path);

    if config_file.exists() && !force {
        println!("Configuration already exists at {}", config_file.display());
        println!();
        println!("Use --force to replace it with the sample network.");
        return Ok(());
    }

    NetworkConfig::sample().save(&config_file)?;

    println!("✓ Created configuration at {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit servers, links, filters and the script");
    println!("  2. Check it:      mailnet check");
    println!("  3. Run it:        mailnet simulate");

    Ok(())
}

fn handle_check_command(config: &NetworkConfig) -> mailnet::Result<()> {
    match validate_config(config) {
        Ok(()) => {
            println!(
                "✓ Configuration is valid ({} servers, {} links, {} filters, {} scripted messages)",
                config.servers.len(),
                config.links.len(),
                config.filters.len(),
                config.script.len()
            );
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                println!("✗ {}", error);
            }
            Err(MailnetError::Validation(errors))
        }
    }
}

fn handle_topology_command(config: &NetworkConfig) -> mailnet::Result<()> {
    let network = config.build_network()?;

    println!("Strategy: {}", network.strategy());
    println!();
    for server in network.servers() {
        println!("{}", server.name());

        let users: Vec<&str> = server.users().iter().map(UserId::as_str).collect();
        if users.is_empty() {
            println!("  users: (none)");
        } else {
            println!("  users: {}", users.join(", "));
        }

        let neighbors: Vec<&str> = server
            .neighbors()
            .iter()
            .filter_map(|id| network.server(*id).map(|s| s.name()))
            .collect();
        if neighbors.is_empty() {
            println!("  links: (none)");
        } else {
            println!("  links: {}", neighbors.join(", "));
        }
    }

    Ok(())
}

fn handle_route_command(
    config: &NetworkConfig,
    from: &str,
    to: &str,
    strategy: Option<RouteStrategy>,
) -> mailnet::Result<()> {
    let network = config.build_network()?;
    let strategy = strategy.unwrap_or(network.strategy());
    let origin = network
        .server_by_name(from)
        .ok_or_else(|| MailnetError::UnknownServer(from.to_string()))?;
    let receiver: UserId = to.parse()?;

    let visited = route_names(&network, &network.reachable(origin, strategy));
    println!("Search order ({}): {}", strategy, visited.join(", "));

    match network.locate(origin, &receiver, strategy) {
        Some(route) => println!(
            "✓ {} found: {} ({} hops)",
            receiver,
            route_names(&network, route.path()).join(" -> "),
            route.hops()
        ),
        None => println!("✗ {} is unreachable from {}", receiver, from),
    }

    Ok(())
}

/// One scripted send in the simulation report
#[derive(Debug, Serialize)]
struct DeliveryRecord {
    server: String,
    from: String,
    to: String,
    subject: String,
    urgent: bool,
    delivered: bool,
    route: Option<Vec<String>>,
}

/// Folder contents in the simulation report
#[derive(Debug, Serialize)]
struct FolderSnapshot {
    path: String,
    messages: Vec<Message>,
}

/// One mailbox in the simulation report
#[derive(Debug, Serialize)]
struct MailboxSnapshot {
    server: String,
    user: String,
    folders: Vec<FolderSnapshot>,
    /// Urgent messages in the order they were processed
    processed_urgent: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    strategy: RouteStrategy,
    deliveries: Vec<DeliveryRecord>,
    mailboxes: Vec<MailboxSnapshot>,
}

fn handle_simulate_command(
    config: &NetworkConfig,
    strategy: Option<RouteStrategy>,
    json: bool,
) -> mailnet::Result<()> {
    let mut network = config.build_network()?;
    if let Some(strategy) = strategy {
        network.set_strategy(strategy);
    }

    let mut deliveries = Vec::with_capacity(config.script.len());
    for entry in &config.script {
        let outcome = entry.send(&mut network)?;
        deliveries.push(delivery_record(&network, entry, &outcome));
    }

    let mailboxes = process_urgent_queues(&mut network);

    if json {
        let report = SimulationReport {
            strategy: network.strategy(),
            deliveries,
            mailboxes,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Deliveries ({}):", network.strategy());
    for record in &deliveries {
        let marker = if record.urgent { " [URGENT]" } else { "" };
        match &record.route {
            Some(route) => println!(
                "  ✓ {}@{} -> {}: {}{} via {}",
                record.from,
                record.server,
                record.to,
                record.subject,
                marker,
                route.join(" -> ")
            ),
            None => println!(
                "  ✗ {}@{} -> {}: {}{} (unreachable)",
                record.from, record.server, record.to, record.subject, marker
            ),
        }
    }

    let urgent: Vec<_> = mailboxes
        .iter()
        .flat_map(|m| m.processed_urgent.iter().map(move |msg| (m, msg)))
        .collect();
    if !urgent.is_empty() {
        println!();
        println!("Urgent messages processed:");
        for (mailbox, message) in urgent {
            println!("  {}@{}: {}", mailbox.user, mailbox.server, message);
        }
    }

    println!();
    print!("{}", network.render_structure());

    Ok(())
}

fn delivery_record(
    network: &Network,
    entry: &ScriptedMessage,
    outcome: &DeliveryOutcome,
) -> DeliveryRecord {
    DeliveryRecord {
        server: entry.server.clone(),
        from: entry.from.clone(),
        to: entry.to.clone(),
        subject: entry.subject.clone(),
        urgent: entry.urgent,
        delivered: outcome.is_delivered(),
        route: outcome
            .route()
            .map(Route::path)
            .map(|path| route_names(network, path)),
    }
}

/// Drain every urgent queue and snapshot each mailbox afterwards
fn process_urgent_queues(network: &mut Network) -> Vec<MailboxSnapshot> {
    let homes: Vec<_> = network
        .servers()
        .iter()
        .flat_map(|s| s.users().iter().map(move |u| (s.id(), u.clone())))
        .collect();

    let mut snapshots = Vec::with_capacity(homes.len());
    for (server, user) in homes {
        let server_name = network
            .server(server)
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        let Some(mailbox) = network.mailbox_mut(server, &user) else {
            continue;
        };

        let processed_urgent = mailbox.process_urgent();
        let tree = mailbox.tree();
        let folders = tree
            .preorder(tree.root())
            .into_iter()
            .filter_map(|id| {
                Some(FolderSnapshot {
                    path: tree.path(id)?,
                    messages: tree.get(id)?.messages().to_vec(),
                })
            })
            .collect();

        snapshots.push(MailboxSnapshot {
            server: server_name,
            user: user.to_string(),
            folders,
            processed_urgent,
        });
    }
    snapshots
}

fn route_names(network: &Network, path: &[ServerId]) -> Vec<String> {
    path.iter()
        .filter_map(|id| network.server(*id).map(|s| s.name().to_string()))
        .collect()
}
