//! Snapshot projections: the composed read-only view sent to clients.
//!
//! Snapshots are always recomputed from the room — never mutated directly.

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, PlayerSlot};

/// Public view of one player slot. Tokens and timestamps stay server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub ready: bool,
    pub connected: bool,
}

/// Both slots keyed by their wire names. `P2` is `null` until joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotViews {
    #[serde(rename = "P1")]
    pub p1: PlayerView,
    #[serde(rename = "P2")]
    pub p2: Option<PlayerView>,
}

/// Derived lobby projection of a room.
///
/// The pause fields are either all `null` (no disconnect in progress) or all
/// set — the room keeps them as a single tagged state and flattens them here
/// for the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub room_code: String,
    pub started: bool,
    pub host_id: PlayerSlot,
    pub mode: String,
    pub players: SlotViews,
    pub disconnected_player_id: Option<PlayerSlot>,
    pub paused_at_ms: Option<u64>,
    pub timeout_at_ms: Option<u64>,
}

/// The composed response body every successful room call returns:
/// lobby projection, simulation state, and chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<S> {
    pub server_now_ms: u64,
    pub lobby: LobbySnapshot,
    pub state: Option<S>,
    pub chat: Vec<ChatMessage>,
}
