//! # CLI Command Implementations

use crate::api::{self, AppState};
use graphgate_core::{Database, EngineConfig, GatewayConfig, GatewayError, ServerInfo, schema};

// =============================================================================
// ENGINE
// =============================================================================

/// Open the embedded engine described by `config`.
#[cfg(feature = "kuzu")]
pub fn open_database(config: &EngineConfig) -> Result<Database, GatewayError> {
    let engine = graphgate_core::KuzuEngine::open(config)?;
    tracing::info!("Database opened in {} mode", config.access_mode);
    Ok(Database::new(engine))
}

/// Open the embedded engine described by `config`.
#[cfg(not(feature = "kuzu"))]
pub fn open_database(config: &EngineConfig) -> Result<Database, GatewayError> {
    Err(GatewayError::Connection(format!(
        "cannot open {}: graphgate was built without the `kuzu` feature",
        config.path.display()
    )))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
///
/// Startup is fail-fast: if the engine version cannot be read, the server
/// never starts listening.
pub async fn cmd_server(config: GatewayConfig, host: &str) -> Result<(), GatewayError> {
    let database = open_database(&config.database)?;

    let snapshot_db = database.clone();
    let info = tokio::task::spawn_blocking(move || ServerInfo::capture(&snapshot_db))
        .await
        .map_err(|e| GatewayError::Io(format!("Version lookup did not complete: {}", e)))?
        .inspect_err(|e| tracing::error!("Error getting version of Kùzu: {}", e))?;

    tracing::info!("Version of Kùzu: {}", info.version);

    let addr = format!("{}:{}", host, config.port);
    api::run_server(&addr, AppState::new(database, info), &config).await
}

// =============================================================================
// VERSION COMMAND
// =============================================================================

/// Print engine version, storage version and access mode.
pub fn cmd_version(config: &GatewayConfig, json_mode: bool) -> Result<(), GatewayError> {
    let database = open_database(&config.database)?;
    let info = ServerInfo::capture(&database)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&info).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Kùzu version:    {}", info.version);
    match info.storage_version {
        Some(v) => println!("Storage version: {}", v),
        None => println!("Storage version: unknown"),
    }
    println!("Access mode:     {}", info.mode);

    Ok(())
}

// =============================================================================
// SCHEMA COMMAND
// =============================================================================

/// Print the node and relationship table schema.
pub fn cmd_schema(config: &GatewayConfig) -> Result<(), GatewayError> {
    let database = open_database(&config.database)?;
    let schema = database.with_connection(schema::introspect)?;

    let output = serde_json::to_string_pretty(&schema)
        .map_err(|e| GatewayError::UnexpectedResult(format!("Cannot render schema: {}", e)))?;
    println!("{}", output);

    Ok(())
}
