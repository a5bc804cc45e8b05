//! CLI command definitions
//!
//! All CLI structs and subcommand enums are defined here.

use clap::{Parser, Subcommand};
use mailnet::graph::RouteStrategy;

/// Mailnet - simulate mail delivery across a network of servers
#[derive(Parser, Debug)]
#[command(name = "mailnet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/mailnet/network.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample network configuration
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration
    Check,

    /// Show servers, users and links
    Topology,

    /// Locate a user from a server without sending anything
    Route {
        /// Server to search from
        #[arg(long)]
        from: String,

        /// User id to locate
        #[arg(long)]
        to: String,

        /// Search strategy (bfs, dfs); defaults to the configured one
        #[arg(short, long)]
        strategy: Option<RouteStrategy>,
    },

    /// Build the network, send the scripted messages and show the result
    Simulate {
        /// Search strategy (bfs, dfs); defaults to the configured one
        #[arg(short, long)]
        strategy: Option<RouteStrategy>,

        /// Output the final state as JSON
        #[arg(long)]
        json: bool,
    },
}
