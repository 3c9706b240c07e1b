//! Router assembly and the serve loop.

use std::any::Any;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use matchgate_room::{GameEngine, RoomRegistry};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::{handler, ServerConfig};

/// Builds the full application router around a registry.
///
/// Every route answers JSON, including the fallbacks: an unknown path is a
/// structured 404 and a known path hit with the wrong method is a
/// structured 405, so clients never have to parse axum's plain-text
/// defaults.
pub fn router<E: GameEngine>(
    registry: Arc<RoomRegistry<E>>,
    config: &ServerConfig,
) -> Router {
    Router::new()
        .route(
            "/api/room/create",
            post(handler::create::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/join",
            post(handler::join::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/ready",
            post(handler::ready::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/start",
            post(handler::start::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/state",
            get(handler::state::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/action",
            post(handler::action::<E>).fallback(method_not_allowed),
        )
        .route(
            "/api/room/chat",
            post(handler::chat::<E>).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .with_state(registry)
}

/// Binds the listener and runs the server until the process exits.
pub async fn serve<E: GameEngine>(
    registry: Arc<RoomRegistry<E>>,
    config: ServerConfig,
) -> std::io::Result<()> {
    let config = config.validated();
    let app = router(registry, &config);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "matchgate listening");
    axum::serve(listener, app).await
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NOT_FOUND",
            "message": "unknown route",
        })),
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "METHOD_NOT_ALLOWED",
            "message": "method not allowed on this route",
        })),
    )
        .into_response()
}

/// A handler panic must not tear down the connection without a body. The
/// room lock is released on unwind, so the room itself stays serviceable.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(%details, "handler panicked");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "MULTIPLAYER_HANDLER_ERROR",
            "message": "request could not be processed",
            "details": details,
        })),
    )
        .into_response()
}
