//! Registry configuration: TTL, capacity, and reconnect-pause tuning.

use std::env;

/// Tunables for the room registry. All environment-driven with documented
/// defaults; `validated()` clamps degenerate values to sane floors.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Idle time after which a room is evicted on its next access.
    /// Env: `MATCHGATE_ROOM_TTL_MS`. Default: 6 hours.
    pub room_ttl_ms: u64,

    /// Maximum number of simultaneously live rooms.
    /// Env: `MATCHGATE_MAX_ROOMS`. Default: 200.
    pub max_rooms: usize,

    /// How long a player may go silent before being treated as
    /// disconnected, and how long a running match stays paused awaiting
    /// their return. Env: `MATCHGATE_RECONNECT_PAUSE_MS`. Default: 90 s.
    pub reconnect_pause_ms: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_ttl_ms: 6 * 60 * 60 * 1000,
            max_rooms: 200,
            reconnect_pause_ms: 90_000,
        }
    }
}

impl RoomConfig {
    /// Minimum accepted TTL and pause window.
    pub const MIN_TTL_MS: u64 = 1_000;
    pub const MIN_PAUSE_MS: u64 = 1_000;

    /// Loads configuration from the environment, falling back to defaults
    /// for unset or unparseable values, then clamps.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            room_ttl_ms: env_u64("MATCHGATE_ROOM_TTL_MS", defaults.room_ttl_ms),
            max_rooms: env_u64("MATCHGATE_MAX_ROOMS", defaults.max_rooms as u64)
                as usize,
            reconnect_pause_ms: env_u64(
                "MATCHGATE_RECONNECT_PAUSE_MS",
                defaults.reconnect_pause_ms,
            ),
        }
        .validated()
    }

    /// Clamps out-of-range values so the config is safe to use. A zero TTL
    /// or pause window would expire every room on its second access.
    pub fn validated(mut self) -> Self {
        if self.room_ttl_ms < Self::MIN_TTL_MS {
            tracing::warn!(
                ttl_ms = self.room_ttl_ms,
                floor = Self::MIN_TTL_MS,
                "room TTL below floor, clamping"
            );
            self.room_ttl_ms = Self::MIN_TTL_MS;
        }
        if self.reconnect_pause_ms < Self::MIN_PAUSE_MS {
            tracing::warn!(
                pause_ms = self.reconnect_pause_ms,
                floor = Self::MIN_PAUSE_MS,
                "reconnect pause below floor, clamping"
            );
            self.reconnect_pause_ms = Self::MIN_PAUSE_MS;
        }
        if self.max_rooms == 0 {
            tracing::warn!("max_rooms of zero would reject every create, clamping to 1");
            self.max_rooms = 1;
        }
        self
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
