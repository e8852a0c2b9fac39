//! # Database Connection Manager
//!
//! A thin adapter over the embedded engine. It owns no logic of its own
//! beyond making the connection lifecycle hard to get wrong:
//!
//! - [`Database::acquire`] returns a [`Connection`] guard
//! - dropping the guard releases the connection, on success, on error and
//!   while unwinding
//! - [`Database::with_connection`] is the scoped form used by the handlers
//!
//! Each request acquires its own connection; no handle outlives a request.

use crate::engine::{EngineConnection, GraphEngine, Params, QueryRows};
use crate::{AccessMode, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Administrative query returning the engine version.
pub const DB_VERSION_QUERY: &str = "CALL db_version() RETURN *;";

// =============================================================================
// DATABASE
// =============================================================================

/// Shared handle to the opened engine. Cloning is cheap.
#[derive(Clone)]
pub struct Database {
    engine: Arc<dyn GraphEngine>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("access_mode", &self.engine.access_mode())
            .finish_non_exhaustive()
    }
}

impl Database {
    pub fn new<E>(engine: E) -> Self
    where
        E: GraphEngine + 'static,
    {
        Self::from_arc(Arc::new(engine))
    }

    pub fn from_arc(engine: Arc<dyn GraphEngine>) -> Self {
        Self { engine }
    }

    /// Obtain a connection from the engine. No retry is attempted.
    pub fn acquire(&self) -> Result<Connection<'_>, GatewayError> {
        let inner = self.engine.connect()?;
        Ok(Connection {
            engine: self.engine.as_ref(),
            inner: Some(inner),
        })
    }

    /// Return a connection to the engine.
    ///
    /// Equivalent to dropping the guard; provided so call sites can make
    /// the release explicit.
    pub fn release(&self, connection: Connection<'_>) {
        drop(connection);
    }

    /// Acquire a connection, run `body` with it, release it.
    ///
    /// The connection is released exactly once whatever `body` returns.
    pub fn with_connection<T, F>(&self, body: F) -> Result<T, GatewayError>
    where
        F: FnOnce(&mut Connection<'_>) -> Result<T, GatewayError>,
    {
        let mut connection = self.acquire()?;
        let result = body(&mut connection);
        self.release(connection);
        result
    }

    pub fn access_mode(&self) -> AccessMode {
        self.engine.access_mode()
    }

    pub fn access_mode_string(&self) -> &'static str {
        self.engine.access_mode().as_str()
    }

    /// Ask the engine for its version.
    pub fn db_version(&self) -> Result<DbVersion, GatewayError> {
        let rows = self.with_connection(|conn| conn.query(DB_VERSION_QUERY, &Params::new()))?;
        let version = match rows.first_value() {
            Some(Value::String(version)) => version.clone(),
            Some(Value::Null) | None => {
                return Err(GatewayError::UnexpectedResult(
                    "db_version() returned no value".to_string(),
                ));
            }
            Some(other) => other.to_string(),
        };

        Ok(DbVersion {
            version,
            storage_version: self.engine.storage_version(),
        })
    }
}

// =============================================================================
// CONNECTION GUARD
// =============================================================================

/// A connection checked out from the engine.
///
/// Released back to the engine when dropped.
pub struct Connection<'a> {
    engine: &'a dyn GraphEngine,
    inner: Option<Box<dyn EngineConnection + 'a>>,
}

impl Connection<'_> {
    /// Run a statement on this connection.
    pub fn query(&mut self, statement: &str, params: &Params) -> Result<QueryRows, GatewayError> {
        match self.inner.as_mut() {
            Some(conn) => conn.query(statement, params),
            None => Err(GatewayError::Connection(
                "connection already released".to_string(),
            )),
        }
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.inner.take() {
            self.engine.disconnect(conn);
        }
    }
}

// =============================================================================
// VERSION / SERVER INFO
// =============================================================================

/// Engine and storage-format versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbVersion {
    pub version: String,
    pub storage_version: Option<u64>,
}

/// Snapshot of what the server reports about itself.
///
/// Captured once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub storage_version: Option<u64>,
    pub mode: AccessMode,
}

impl ServerInfo {
    /// Query the engine once and freeze the result.
    pub fn capture(database: &Database) -> Result<Self, GatewayError> {
        let DbVersion {
            version,
            storage_version,
        } = database.db_version()?;
        Ok(Self {
            version,
            storage_version,
            mode: database.access_mode(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
