//! The full error taxonomy for room operations.
//!
//! Every variant carries a stable machine-readable code (clients key retry
//! and UI behavior off it) and maps to one HTTP status. Nothing here is
//! retried server-side.

/// Errors returned by room operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The allocator exhausted its random draws without finding a free code.
    #[error("no room code available, try again")]
    RoomCodeUnavailable,

    /// The caller's preferred code is taken by a live room.
    #[error("requested room code is already in use")]
    RoomCodeInUse,

    /// The registry is at its configured room cap.
    #[error("server is at room capacity, try again later")]
    RoomCapacityReached,

    /// No room under that code.
    #[error("room not found")]
    RoomNotFound,

    /// The room sat idle past its TTL and was evicted by this access.
    #[error("room expired after {} of inactivity", human_duration(*.idle_ms))]
    RoomExpired { idle_ms: u64 },

    /// The second slot is occupied by a connected player.
    #[error("room is full")]
    RoomFull,

    /// Missing or invalid token. Deliberately does not distinguish a wrong
    /// token from anything else about the room, to avoid enumeration.
    #[error("unauthorized")]
    Unauthorized,

    /// A disconnect pause is active; echoes time until forced resolution.
    #[error("match paused, {}s until forfeit", .remaining_ms / 1000)]
    MatchPaused { remaining_ms: u64 },

    /// Actions require a started match.
    #[error("match has not started")]
    MatchNotStarted,

    /// Only the host (P1) may start the match.
    #[error("only the host can start the match")]
    OnlyHostCanStart,

    /// Start requires a present second player.
    #[error("player two has not joined")]
    PlayerTwoNotJoined,

    /// Start requires both ready flags.
    #[error("both players must be ready")]
    BothPlayersMustBeReady,

    /// Chat text was empty after sanitizing.
    #[error("chat message is empty or invalid")]
    InvalidChatMessage,
}

impl MatchError {
    /// The stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomCodeUnavailable => "ROOM_CODE_UNAVAILABLE",
            Self::RoomCodeInUse => "ROOM_CODE_IN_USE",
            Self::RoomCapacityReached => "ROOM_CAPACITY_REACHED",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomExpired { .. } => "ROOM_EXPIRED",
            Self::RoomFull => "ROOM_FULL",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MatchPaused { .. } => "MATCH_PAUSED",
            Self::MatchNotStarted => "MATCH_NOT_STARTED",
            Self::OnlyHostCanStart => "ONLY_HOST_CAN_START",
            Self::PlayerTwoNotJoined => "PLAYER_TWO_NOT_JOINED",
            Self::BothPlayersMustBeReady => "BOTH_PLAYERS_MUST_BE_READY",
            Self::InvalidChatMessage => "INVALID_CHAT_MESSAGE",
        }
    }

    /// The HTTP status the server layer returns for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::RoomCodeUnavailable | Self::RoomCapacityReached => 503,
            Self::RoomNotFound | Self::RoomExpired { .. } => 404,
            Self::Unauthorized => 401,
            Self::OnlyHostCanStart => 403,
            Self::RoomCodeInUse
            | Self::RoomFull
            | Self::MatchPaused { .. }
            | Self::MatchNotStarted
            | Self::PlayerTwoNotJoined
            | Self::BothPlayersMustBeReady => 409,
            Self::InvalidChatMessage => 400,
        }
    }
}

/// Rounds a millisecond duration to the largest sensible unit for error
/// messages ("2h 15m", "45s").
fn human_duration(ms: u64) -> String {
    let secs = ms / 1000;
    let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {}s", secs % 60)
    } else {
        format!("{secs}s")
    }
}
