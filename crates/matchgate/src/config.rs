//! Server configuration: bind address and request body limit.

use std::env;

/// Tunables for the HTTP layer. Room-level tuning lives in
/// `matchgate_room::RoomConfig`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to.
    /// Env: `MATCHGATE_ADDR`. Default: `0.0.0.0:8080`.
    pub addr: String,

    /// Maximum accepted request body size in bytes. Action payloads are
    /// opaque JSON, so this is the only bound on their size.
    /// Env: `MATCHGATE_MAX_BODY_BYTES`. Default: 64 KiB.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Minimum accepted body limit. Anything smaller would reject even the
    /// bare create request.
    pub const MIN_BODY_BYTES: usize = 1_024;

    /// Loads configuration from the environment, falling back to defaults
    /// for unset or unparseable values, then clamps.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env::var("MATCHGATE_ADDR").unwrap_or(defaults.addr),
            max_body_bytes: env::var("MATCHGATE_MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        }
        .validated()
    }

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.max_body_bytes < Self::MIN_BODY_BYTES {
            tracing::warn!(
                body_bytes = self.max_body_bytes,
                floor = Self::MIN_BODY_BYTES,
                "body limit below floor, clamping"
            );
            self.max_body_bytes = Self::MIN_BODY_BYTES;
        }
        self
    }
}
