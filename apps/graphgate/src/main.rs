//! # graphgate - Kùzu REST Gateway
//!
//! The main binary: exposes an embedded Kùzu database's schema
//! introspection and Cypher execution over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 apps/graphgate (THE BINARY)               │
//! │                                                           │
//! │      ┌─────────────┐            ┌─────────────┐           │
//! │      │    CLI      │            │  HTTP API   │           │
//! │      │   (clap)    │            │   (axum)    │           │
//! │      └──────┬──────┘            └──────┬──────┘           │
//! │             └─────────────┬────────────┘                  │
//! │                           ▼                               │
//! │                  ┌─────────────────┐                      │
//! │                  │ graphgate-core  │                      │
//! │                  │  (THE ADAPTER)  │                      │
//! │                  └────────┬────────┘                      │
//! │                           ▼                               │
//! │                    embedded Kùzu                          │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server on $PORT (default 8000)
//! CROSS_ORIGIN=true KUZU_PATH=./graph graphgate
//!
//! # One-shot commands
//! graphgate version --json-mode
//! graphgate schema
//! ```

use clap::Parser;
use graphgate::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — GRAPHGATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GRAPHGATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graphgate=info,graphgate_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Exit explicitly: blocking engine calls still in flight must not hold
    // the process open after a shutdown signal.
    match cli::execute(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the graphgate startup banner.
fn print_banner() {
    println!(
        r#"
   __ _ _ __ __ _ _ __ | |__   __ _  __ _| |_ ___
  / _` | '__/ _` | '_ \| '_ \ / _` |/ _` | __/ _ \
 | (_| | | | (_| | |_) | | | | (_| | (_| | ||  __/
  \__, |_|  \__,_| .__/|_| |_|\__, |\__,_|\__\___|
  |___/          |_|          |___/

  Kùzu REST Gateway v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
