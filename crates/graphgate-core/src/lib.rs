//! # graphgate-core
//!
//! Everything the graphgate HTTP gateway knows about its embedded graph
//! engine.
//!
//! This crate holds no query language, storage or transaction logic: those
//! belong to the engine. What it does own is the glue around it:
//! - `config`: environment-driven runtime configuration
//! - `engine`: the object-safe seam to the embedded engine (Kùzu behind the
//!   `kuzu` feature)
//! - `database`: connection acquire/release and the startup version snapshot
//! - `schema`: node/rel table introspection over one connection
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies
//! - Every engine call is blocking; the HTTP layer decides where it runs
//! - A connection is always released, whatever happens while it is held

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod schema;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{AccessMode, EngineConfig, GatewayConfig};
pub use database::{Connection, Database, DbVersion, ServerInfo};
pub use engine::{EngineConnection, GraphEngine, Params, QueryRows, Record};
pub use error::GatewayError;
pub use schema::{Connectivity, NodeTable, Property, RelTable, Schema};

#[cfg(feature = "kuzu")]
pub use engine::kuzu::KuzuEngine;
