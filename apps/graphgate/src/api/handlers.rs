//! # API Endpoint Handlers
//!
//! Every handler that touches the engine follows the same shape: move the
//! work to a blocking thread, acquire a connection, run the call, release
//! the connection, answer with JSON.

use super::{
    AppState,
    error::ApiError,
    types::{CypherRequest, StateResponse},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use graphgate_core::{Database, GatewayError, Record, Schema, schema};

/// Run a blocking engine call off the async reactor.
async fn run_blocking<T, F>(database: Database, body: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T, GatewayError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || body(&database)).await?;
    Ok(result?)
}

// =============================================================================
// STATE HANDLER
// =============================================================================

/// Server state captured at startup.
pub async fn state_handler(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse::from(state.info.as_ref()))
}

// =============================================================================
// SCHEMA HANDLER
// =============================================================================

/// Describe every node and relationship table.
pub async fn schema_handler(State(state): State<AppState>) -> Result<Json<Schema>, ApiError> {
    let schema = run_blocking(state.database, |db| db.with_connection(schema::introspect)).await?;
    Ok(Json(schema))
}

// =============================================================================
// CYPHER HANDLER
// =============================================================================

/// Execute a statement and return all rows as records.
pub async fn cypher_handler(
    State(state): State<AppState>,
    payload: Result<Json<CypherRequest>, JsonRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Json(CypherRequest { query, params }) = payload?;
    let params = params.unwrap_or_default();

    tracing::debug!("Executing query: {}", query);

    let rows = run_blocking(state.database, move |db| {
        db.with_connection(|conn| conn.query(&query, &params))
    })
    .await?;

    Ok(Json(rows.into_records()))
}
