//! # graphgate HTTP API Module
//!
//! This module implements the HTTP REST server using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Server state (status, engine version, access mode)
//! - `GET /schema` - Node and relationship table schema
//! - `POST /cypher` - Execute a Cypher statement, returns an array of records
//!
//! `/schema/` and `/cypher/` are accepted as well.
//!
//! ## Configuration (Environment Variables)
//!
//! - `CROSS_ORIGIN`: `"true"` enables permissive CORS for all origins
//! - `MAX_PAYLOAD_SIZE`: JSON body limit (default `128mb`), larger bodies get 413

mod error;
mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `graphgate::api::*`)
pub use error::ApiError;
pub use handlers::{cypher_handler, schema_handler, state_handler};
pub use types::{CypherRequest, ErrorResponse, StateResponse};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use graphgate_core::{Database, GatewayConfig, GatewayError, ServerInfo};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the engine handle and the startup snapshot.
#[derive(Clone, Debug)]
pub struct AppState {
    pub database: Database,
    pub info: Arc<ServerInfo>,
}

impl AppState {
    #[must_use]
    pub fn new(database: Database, info: ServerInfo) -> Self {
        Self {
            database,
            info: Arc::new(info),
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. Body limit - rejects bodies over `MAX_PAYLOAD_SIZE` with 413
/// 3. CORS - permissive, only when `CROSS_ORIGIN` is set
///
/// The body limit is enforced by the JSON extractor, so a 413 is built
/// inside the CORS layer and carries its headers.
pub fn create_router(state: AppState, config: &GatewayConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::state_handler))
        .route("/schema", get(handlers::schema_handler))
        .route("/schema/", get(handlers::schema_handler))
        .route("/cypher", post(handlers::cypher_handler))
        .route("/cypher/", post(handlers::cypher_handler));

    if config.cross_origin {
        tracing::info!("CORS enabled for all origins");
        router = router.layer(CorsLayer::permissive());
    }

    let max_payload = config.max_payload_bytes();
    tracing::debug!("JSON body limit: {} bytes", max_payload);

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_payload)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP / SHUTDOWN
// =============================================================================

/// Start the HTTP server and run it until SIGINT or SIGTERM.
///
/// In-flight requests are not drained: once a signal arrives this returns
/// and the caller is expected to exit.
pub async fn run_server(
    addr: &str,
    state: AppState,
    config: &GatewayConfig,
) -> Result<(), GatewayError> {
    let router = create_router(state, config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Io(format!("Bind failed: {}", e)))?;
    let port = listener
        .local_addr()
        .map(|a| a.port())
        .unwrap_or(config.port);

    tracing::info!("Deployed server started on port: {}", port);

    serve_until(listener, router, shutdown_signal()).await
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// `shutdown` yields the name of whatever stopped the server. The listener
/// is dropped on return, so later connection attempts are refused.
pub async fn serve_until<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), GatewayError>
where
    F: Future<Output = &'static str>,
{
    tokio::select! {
        result = axum::serve(listener, router).into_future() => {
            result.map_err(|e| GatewayError::Io(format!("Server error: {}", e)))
        }
        signal = shutdown => {
            tracing::info!("{} received, exiting", signal);
            Ok(())
        }
    }
}

/// Resolve with the name of the first termination signal received.
pub async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::warn!("Cannot listen for SIGINT: {}", e);
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<&'static str>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    }
}
