//! # graphgate
//!
//! REST gateway for an embedded Kùzu graph database.
//!
//! - [`api`]: axum router, handlers and server lifecycle
//! - [`cli`]: clap commands wrapping the server and a few one-shot queries

pub mod api;
pub mod cli;
