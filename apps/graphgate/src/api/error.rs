//! # API Errors
//!
//! Every request-level failure ends up here and leaves as
//! `{"error": "..."}` with a matching status code. Nothing unwinds past
//! the router.

use super::types::ErrorResponse;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use graphgate_core::GatewayError;
use std::fmt;
use tokio::task::JoinError;

#[derive(Debug)]
pub enum ApiError {
    /// The engine or the connection manager failed.
    Gateway(GatewayError),
    /// The body was rejected before reaching the handler (bad JSON,
    /// missing field, wrong content type, too large).
    Rejected { status: StatusCode, message: String },
    /// The blocking task running the engine call did not complete.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Gateway(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway(e) => write!(f, "{}", e),
            Self::Rejected { message, .. } => f.write_str(message),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(GatewayError::Query("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GatewayError::Connection("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Rejected {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "too big".into()
            }
            .status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_message_is_engine_message() {
        let err = ApiError::from(GatewayError::Query("Binder exception: x".into()));
        assert_eq!(err.to_string(), "Binder exception: x");
    }
}
