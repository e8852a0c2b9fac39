//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. The cypher
//! endpoint answers with a bare array of records and the schema endpoint
//! with [`graphgate_core::Schema`], so neither needs a wrapper here.

use graphgate_core::{Params, ServerInfo};
use serde::{Deserialize, Serialize};

// =============================================================================
// STATE RESPONSE
// =============================================================================

/// Server state returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub status: String,
    pub version: String,
    pub storage_version: Option<u64>,
    pub mode: String,
}

impl From<&ServerInfo> for StateResponse {
    fn from(info: &ServerInfo) -> Self {
        Self {
            status: "ok".to_string(),
            version: info.version.clone(),
            storage_version: info.storage_version,
            mode: info.mode.to_string(),
        }
    }
}

// =============================================================================
// CYPHER REQUEST
// =============================================================================

/// Body of `POST /cypher`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CypherRequest {
    pub query: String,
    /// Named parameters; `parameters` is accepted as well.
    #[serde(default, alias = "parameters", skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl CypherRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
