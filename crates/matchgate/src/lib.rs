//! # Matchgate
//!
//! HTTP match room authority for two-player real-time games.
//!
//! A game implements the [`GameEngine`] trait from `matchgate-room`; this
//! crate wraps a [`RoomRegistry`] of that engine in a JSON-over-HTTP router:
//! room creation, token auth, lobby readiness, presence supervision with
//! reconnect pauses, a lazily-driven match clock, an opaque action gateway,
//! and chat relay.
//!
//! ```rust,ignore
//! let registry = Arc::new(RoomRegistry::<MyEngine>::new(
//!     RoomConfig::from_env(),
//!     MyEngineConfig::default(),
//!     Arc::new(SystemClock),
//! ));
//! matchgate::serve(registry, ServerConfig::from_env()).await?;
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use matchgate_room::{GameEngine, RoomConfig, RoomRegistry, SystemClock};
pub use server::{router, serve};
