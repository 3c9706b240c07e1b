//! Room lifecycle management for Matchgate.
//!
//! This crate is the authority for two-player matches: it owns the registry
//! of active rooms, gates match start, derives connectivity from heartbeat
//! timestamps, advances simulation time, and gateways player actions into
//! the embedded game engine.
//!
//! # Key types
//!
//! - [`GameEngine`] — the trait the simulation engine implements
//! - [`RoomRegistry`] — creates, looks up, and evicts rooms; every inbound
//!   call goes through it
//! - [`Room`] — one match's authoritative state container
//! - [`RoomConfig`] — TTL, capacity, and reconnect-pause tuning
//! - [`MatchError`] — the full error taxonomy with wire codes
//! - [`Clock`] — injectable wall-clock source ([`SystemClock`] in
//!   production, [`FakeClock`] in tests)

mod chat;
mod clock;
mod code;
mod config;
mod engine;
mod error;
mod presence;
mod registry;
mod room;

pub use chat::{sanitize_chat, MAX_CHAT_LEN, TRANSCRIPT_CAP};
pub use clock::{Clock, FakeClock, SystemClock};
pub use code::{CODE_ALPHABET, CODE_LEN};
pub use config::RoomConfig;
pub use engine::GameEngine;
pub use error::MatchError;
pub use registry::RoomRegistry;
pub use room::{Player, Presence, Room};
