//! The `Room`: one match's authoritative state container.
//!
//! A room owns its two player slots, its engine instance, and its chat
//! transcript. All mutation happens under the registry's per-room lock —
//! nothing here is concurrent.

use std::collections::VecDeque;

use matchgate_protocol::{
    ActionResult, ChatMessage, LobbySnapshot, PlayerSlot, PlayerView, SlotViews,
};
use matchgate_session::SessionToken;

use crate::chat::{sanitize_chat, TRANSCRIPT_CAP};
use crate::{GameEngine, MatchError};

/// One player slot's server-side record.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub token: SessionToken,
    pub ready: bool,
    pub connected: bool,
    pub joined_at_ms: u64,
    pub last_seen_ms: u64,
}

impl Player {
    fn new(name: String, token: SessionToken, now_ms: u64) -> Self {
        Self {
            name,
            token,
            ready: false,
            connected: true,
            joined_at_ms: now_ms,
            last_seen_ms: now_ms,
        }
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            ready: self.ready,
            connected: self.connected,
        }
    }
}

/// Reconnect-pause state. The three wire fields (`disconnectedPlayerId`,
/// `pausedAtMs`, `timeoutAtMs`) are all null or all set, so they live here
/// as one tagged variant rather than three independent options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Active,
    Paused {
        who: PlayerSlot,
        since_ms: u64,
        deadline_ms: u64,
    },
}

/// One match's authoritative state.
pub struct Room<E: GameEngine> {
    pub code: String,
    pub mode: String,
    pub started: bool,
    pub p1: Player,
    pub p2: Option<Player>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub last_tick_ms: u64,
    pub presence: Presence,
    pub engine: E,
    chat: VecDeque<ChatMessage>,
    next_chat_id: u64,
}

impl<E: GameEngine> Room<E> {
    /// Creates a room with the host occupying P1 and a fresh engine.
    pub fn new(
        code: String,
        mode: String,
        host_name: String,
        host_token: SessionToken,
        engine_config: &E::Config,
        now_ms: u64,
    ) -> Self {
        Self {
            code,
            mode,
            started: false,
            p1: Player::new(host_name, host_token, now_ms),
            p2: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            last_tick_ms: now_ms,
            presence: Presence::Active,
            engine: E::init(engine_config),
            chat: VecDeque::new(),
            next_chat_id: 1,
        }
    }

    // -- authorization & presence bookkeeping -----------------------------

    /// Resolves a presented token to its slot. Exact match against either
    /// slot's token; anything else is `UNAUTHORIZED` with no further detail.
    pub fn authorize(&self, token: &str) -> Result<PlayerSlot, MatchError> {
        if self.p1.token.matches(token) {
            return Ok(PlayerSlot::P1);
        }
        if let Some(p2) = &self.p2 {
            if p2.token.matches(token) {
                return Ok(PlayerSlot::P2);
            }
        }
        Err(MatchError::Unauthorized)
    }

    /// Every authorized call is a heartbeat for its caller.
    pub fn heartbeat(&mut self, slot: PlayerSlot, now_ms: u64) {
        if let Some(player) = self.player_mut(slot) {
            player.last_seen_ms = now_ms;
            player.connected = true;
        }
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        match slot {
            PlayerSlot::P1 => Some(&self.p1),
            PlayerSlot::P2 => self.p2.as_ref(),
        }
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut Player> {
        match slot {
            PlayerSlot::P1 => Some(&mut self.p1),
            PlayerSlot::P2 => self.p2.as_mut(),
        }
    }

    /// Remaining pause time, if a pause is active.
    pub(crate) fn pause_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.presence {
            Presence::Paused { deadline_ms, .. } => {
                Some(deadline_ms.saturating_sub(now_ms))
            }
            Presence::Active => None,
        }
    }

    fn reject_if_paused(&self, now_ms: u64) -> Result<(), MatchError> {
        match self.pause_remaining_ms(now_ms) {
            Some(remaining_ms) => Err(MatchError::MatchPaused { remaining_ms }),
            None => Ok(()),
        }
    }

    // -- lobby state machine ----------------------------------------------

    /// Seats a joiner in P2.
    ///
    /// A present-but-disconnected P2 is silently replaced: the fresh joiner
    /// inherits the slot with a new token and a cleared ready flag. A
    /// connected P2 makes the room full.
    pub fn join(
        &mut self,
        name: String,
        token: SessionToken,
        now_ms: u64,
    ) -> Result<PlayerSlot, MatchError> {
        match &self.p2 {
            Some(p2) if p2.connected => Err(MatchError::RoomFull),
            replaced => {
                if replaced.is_some() {
                    tracing::info!(
                        room = %self.code,
                        "stale P2 replaced by fresh joiner"
                    );
                }
                self.p2 = Some(Player::new(name, token, now_ms));
                Ok(PlayerSlot::P2)
            }
        }
    }

    /// Sets the caller's ready flag to exactly the submitted boolean.
    /// Idempotent; rejected while a disconnect pause is active.
    pub fn set_ready(
        &mut self,
        slot: PlayerSlot,
        ready: bool,
        now_ms: u64,
    ) -> Result<(), MatchError> {
        self.reject_if_paused(now_ms)?;
        if let Some(player) = self.player_mut(slot) {
            player.ready = ready;
        }
        Ok(())
    }

    /// Starts the match: host-only, both slots present and ready, no pause.
    /// `started` becomes permanently true and the tick baseline resets to
    /// now. A second call on a running room is a no-op success (the
    /// baseline is not reset).
    pub fn start(&mut self, slot: PlayerSlot, now_ms: u64) -> Result<(), MatchError> {
        if self.started {
            return Ok(());
        }
        self.reject_if_paused(now_ms)?;
        if !slot.is_host() {
            return Err(MatchError::OnlyHostCanStart);
        }
        let Some(p2) = &self.p2 else {
            return Err(MatchError::PlayerTwoNotJoined);
        };
        if !(self.p1.ready && p2.ready) {
            return Err(MatchError::BothPlayersMustBeReady);
        }
        self.started = true;
        self.last_tick_ms = now_ms;
        tracing::info!(room = %self.code, "match started");
        Ok(())
    }

    // -- action gateway ---------------------------------------------------

    /// Validates and forwards a caller-attributed action to the engine.
    ///
    /// The gateway knows no game rules: schema failures (the payload does
    /// not deserialize, or the engine's validator rejects its shape) come
    /// back as an `INVALID_ACTION` result without touching engine state;
    /// anything well-formed goes to the engine and its verdict is returned
    /// verbatim.
    pub fn apply_action(
        &mut self,
        slot: PlayerSlot,
        payload: serde_json::Value,
        now_ms: u64,
    ) -> Result<ActionResult, MatchError> {
        if !self.started {
            return Err(MatchError::MatchNotStarted);
        }
        self.reject_if_paused(now_ms)?;

        let action: E::Action = match serde_json::from_value(payload) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(room = %self.code, %slot, error = %e, "malformed action");
                return Ok(ActionResult::rejected("INVALID_ACTION", e.to_string()));
            }
        };
        if let Err(reason) = self.engine.validate_action(&action) {
            tracing::debug!(room = %self.code, %slot, %reason, "action failed validation");
            return Ok(ActionResult::rejected("INVALID_ACTION", reason));
        }

        Ok(self.engine.apply_action(slot, action))
    }

    // -- chat relay -------------------------------------------------------

    /// Sanitizes, stamps, and appends a chat message, truncating the
    /// transcript to the newest [`TRANSCRIPT_CAP`] entries. Available
    /// regardless of match state.
    pub fn append_chat(
        &mut self,
        slot: PlayerSlot,
        raw: &str,
        now_ms: u64,
    ) -> Result<ChatMessage, MatchError> {
        let text = sanitize_chat(raw).ok_or(MatchError::InvalidChatMessage)?;
        let author_name = self
            .player(slot)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let message = ChatMessage {
            id: self.next_chat_id,
            author: slot,
            author_name,
            text,
            sent_at_ms: now_ms,
        };
        self.next_chat_id += 1;

        self.chat.push_back(message.clone());
        while self.chat.len() > TRANSCRIPT_CAP {
            self.chat.pop_front();
        }
        Ok(message)
    }

    pub fn chat(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chat.iter()
    }

    // -- match clock / tick bridge ----------------------------------------

    /// Forwards the wall-clock delta since the last tick to the engine —
    /// exactly once per access, only while started. Before start the
    /// timestamp is refreshed without ticking, so no lobby time accumulates
    /// into the first simulation step. Deltas clamp at zero if the host
    /// clock misbehaves.
    pub fn advance_clock(&mut self, now_ms: u64) {
        if self.started {
            let delta_ms = now_ms.saturating_sub(self.last_tick_ms);
            self.engine.tick(delta_ms);
        }
        self.last_tick_ms = now_ms;
    }

    /// Refreshes the TTL timestamp.
    pub fn touch(&mut self, now_ms: u64) {
        self.updated_at_ms = now_ms;
    }

    // -- snapshot projection ----------------------------------------------

    /// Recomputes the lobby projection. Never cached.
    pub fn lobby_snapshot(&self) -> LobbySnapshot {
        let (disconnected_player_id, paused_at_ms, timeout_at_ms) =
            match self.presence {
                Presence::Active => (None, None, None),
                Presence::Paused {
                    who,
                    since_ms,
                    deadline_ms,
                } => (Some(who), Some(since_ms), Some(deadline_ms)),
            };
        LobbySnapshot {
            room_code: self.code.clone(),
            started: self.started,
            host_id: PlayerSlot::P1,
            mode: self.mode.clone(),
            players: SlotViews {
                p1: self.p1.view(),
                p2: self.p2.as_ref().map(Player::view),
            },
            disconnected_player_id,
            paused_at_ms,
            timeout_at_ms,
        }
    }
}
