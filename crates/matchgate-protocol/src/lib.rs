//! Wire protocol for Matchgate.
//!
//! This crate defines the JSON surface that clients and the room authority
//! share:
//!
//! - **Types** ([`PlayerSlot`], [`ChatMessage`], the request bodies, etc.) —
//!   what travels on the wire.
//! - **Snapshots** ([`Snapshot`], [`LobbySnapshot`]) — the composed read-only
//!   view returned by every successful call.
//!
//! The protocol layer knows nothing about rooms, clocks, or HTTP — it only
//! defines shapes. Everything serializes with camelCase field names to match
//! the client side.

mod snapshot;
mod types;

pub use snapshot::{LobbySnapshot, PlayerView, SlotViews, Snapshot};
pub use types::{
    ActionRequest, ActionResult, ChatMessage, ChatRequest, CreateRequest,
    JoinRequest, PlayerSlot, ReadyRequest, SessionInfo, StartRequest,
    StateQuery,
};
