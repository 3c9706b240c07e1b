//! Route handlers.
//!
//! Each handler is a thin adapter: extract the request, call the registry,
//! compose the response body. All domain rules live in `matchgate-room`.
//!
//! Successful responses are the snapshot object with endpoint-specific
//! extras merged in at the top level (`session` on create/join, `result` on
//! action, `message` on chat). Extraction failures surface as
//! `MULTIPLAYER_HANDLER_ERROR` rather than axum's plain-text rejections, so
//! clients always get the structured body.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use matchgate_protocol::{
    ActionRequest, ChatRequest, CreateRequest, JoinRequest, ReadyRequest,
    Snapshot, StartRequest, StateQuery,
};
use matchgate_room::{GameEngine, RoomRegistry};
use serde::Serialize;
use serde_json::Value;

use crate::ApiError;

type Registry<E> = Arc<RoomRegistry<E>>;

/// Serializes the snapshot and merges endpoint extras into its top level.
fn respond<S: Serialize>(
    snapshot: Snapshot<S>,
    extras: impl IntoIterator<Item = (&'static str, Value)>,
) -> Result<Json<Value>, ApiError> {
    let mut body = serde_json::to_value(&snapshot)?;
    let Value::Object(map) = &mut body else {
        return Err(ApiError::handler("snapshot is not a JSON object"));
    };
    for (key, value) in extras {
        map.insert(key.to_string(), value);
    }
    Ok(Json(body))
}

/// `POST /api/room/create`
pub async fn create<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let (snapshot, session) = registry
        .create(req.name, req.preferred_code, req.mode)
        .await?;
    respond(snapshot, [("session", serde_json::to_value(&session)?)])
}

/// `POST /api/room/join`
pub async fn join<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let (snapshot, session) = registry.join(&req.room_code, req.name).await?;
    respond(snapshot, [("session", serde_json::to_value(&session)?)])
}

/// `POST /api/room/ready`
pub async fn ready<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<ReadyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let snapshot = registry
        .set_ready(&req.room_code, &req.token, req.ready)
        .await?;
    respond(snapshot, [])
}

/// `POST /api/room/start`
pub async fn start<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let snapshot = registry.start(&req.room_code, &req.token).await?;
    respond(snapshot, [])
}

/// `GET /api/room/state` — the polling endpoint.
pub async fn state<E: GameEngine>(
    State(registry): State<Registry<E>>,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(req) = query?;
    let snapshot = registry.state(&req.room_code, &req.token).await?;
    respond(snapshot, [])
}

/// `POST /api/room/action`
pub async fn action<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let (snapshot, result) = registry
        .action(&req.room_code, &req.token, req.action)
        .await?;
    respond(snapshot, [("result", serde_json::to_value(&result)?)])
}

/// `POST /api/room/chat`
pub async fn chat<E: GameEngine>(
    State(registry): State<Registry<E>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let (snapshot, message) = registry
        .chat(&req.room_code, &req.token, &req.text)
        .await?;
    respond(snapshot, [("message", serde_json::to_value(&message)?)])
}
