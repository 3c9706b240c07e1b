//! Core wire types: player slots, requests, chat, action results.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlayerSlot
// ---------------------------------------------------------------------------

/// One of the two fixed player slots in a room.
///
/// `P1` is always the host (the player who created the room). `P2` is empty
/// until someone joins and is permanently addressable afterwards — a
/// disconnected second player keeps the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    P1,
    P2,
}

impl PlayerSlot {
    /// The opposing slot.
    pub fn other(self) -> Self {
        match self {
            Self::P1 => Self::P2,
            Self::P2 => Self::P1,
        }
    }

    /// Returns `true` for the host slot.
    pub fn is_host(self) -> bool {
        matches!(self, Self::P1)
    }
}

impl std::fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P1 => write!(f, "P1"),
            Self::P2 => write!(f, "P2"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Credentials minted for a player on create/join.
///
/// The token is the sole authorization mechanism for every later call —
/// there are no passwords and no per-IP binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub room_code: String,
    pub player_id: PlayerSlot,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// One entry in a room's transcript. Immutable once created; the author
/// name is snapshotted at send time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub author: PlayerSlot,
    pub author_name: String,
    pub text: String,
    pub sent_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Action results
// ---------------------------------------------------------------------------

/// Accept/reject outcome of an action, returned verbatim from the engine
/// (or synthesized by the gateway for schema-invalid payloads).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    /// An accepted action.
    pub fn accepted() -> Self {
        Self {
            ok: true,
            code: None,
            message: None,
        }
    }

    /// A rejected action with a stable machine-readable code.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// `POST /api/room/create` — no auth, mints the host session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub name: String,
    #[serde(default)]
    pub preferred_code: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// `POST /api/room/join` — no auth, mints the guest session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub room_code: String,
    pub name: String,
}

/// `POST /api/room/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyRequest {
    pub room_code: String,
    pub token: String,
    pub ready: bool,
}

/// `POST /api/room/start` — host only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub room_code: String,
    pub token: String,
}

/// Query parameters for `GET /api/room/state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateQuery {
    pub room_code: String,
    pub token: String,
}

/// `POST /api/room/action`. The `action` payload is opaque to the router;
/// the caller's slot is injected server-side and never trusted from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub room_code: String,
    pub token: String,
    pub action: serde_json::Value,
}

/// `POST /api/room/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub room_code: String,
    pub token: String,
    pub text: String,
}
