//! HTTP error responses.
//!
//! Every failure leaves the server as a structured JSON body with a stable
//! machine-readable `error` code. Domain failures carry the code and status
//! from [`MatchError`]; everything the handler layer itself trips over
//! (malformed bodies, bad queries, panics) collapses to a single
//! `MULTIPLAYER_HANDLER_ERROR` with the underlying detail preserved in
//! `details`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matchgate_room::MatchError;
use serde_json::json;

/// An error on its way out of a handler.
#[derive(Debug)]
pub enum ApiError {
    /// A room operation failed; status and code come from the taxonomy.
    Match(MatchError),

    /// The handler layer failed before (or around) the room operation.
    Handler { details: String },
}

impl ApiError {
    pub fn handler(details: impl Into<String>) -> Self {
        Self::Handler {
            details: details.into(),
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        Self::Match(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::handler(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::handler(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::handler(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Match(err) => {
                let status = StatusCode::from_u16(err.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = json!({
                    "error": err.code(),
                    "message": err.to_string(),
                });
                (status, Json(body)).into_response()
            }
            Self::Handler { details } => {
                tracing::debug!(%details, "request failed in handler layer");
                let body = json!({
                    "error": "MULTIPLAYER_HANDLER_ERROR",
                    "message": "request could not be processed",
                    "details": details,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_error_maps_code_and_status() {
        let response = ApiError::from(MatchError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_handler_error_is_bad_request() {
        let response = ApiError::handler("boom").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
