//! # graphgate CLI Module
//!
//! This module implements the CLI interface for graphgate.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server (default when no command is given)
//! - `version` - Print the engine and storage versions
//! - `schema` - Print the node and relationship table schema
//!
//! The database itself is configured through the environment; see
//! [`graphgate_core::config`].

mod commands;

use clap::{Parser, Subcommand};
use graphgate_core::{GatewayConfig, GatewayError};

pub use commands::*;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_HOST: &str = "0.0.0.0";

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// graphgate - REST gateway for an embedded Kùzu graph database
#[derive(Parser, Debug)]
#[command(name = "graphgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind to (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print engine version, storage version and access mode
    Version,

    /// Print the database schema as JSON
    Schema,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Server {
            host: DEFAULT_HOST.to_string(),
            port: None,
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GatewayError> {
    let config = GatewayConfig::from_env();

    match cli.command.unwrap_or_default() {
        Commands::Server { host, port } => {
            let config = GatewayConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            cmd_server(config, &host).await
        }
        Commands::Version => cmd_version(&config, cli.json_mode),
        Commands::Schema => cmd_schema(&config),
    }
}
