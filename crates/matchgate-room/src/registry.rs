//! The room registry: the canonical in-memory store of active rooms.
//!
//! The code-keyed map takes an `RwLock` (concurrent reads, exclusive
//! insert/delete); each room sits behind its own tokio `Mutex`, whose FIFO
//! fairness gives the per-room arrival-order serialization the design
//! requires — the presence supervisor, lobby machine, and match clock all
//! read-then-write room fields, so no two mutations of one room may ever
//! interleave.
//!
//! Eviction is lazy: staleness is checked on lookup, never by a background
//! sweep. A room with zero traffic lives until its next access attempt.

use std::collections::HashMap;
use std::sync::Arc;

use matchgate_protocol::{
    ActionResult, ChatMessage, PlayerSlot, SessionInfo, Snapshot,
};
use matchgate_session::SessionToken;
use tokio::sync::{Mutex, RwLock};

use crate::code::{normalize, random_code, MAX_CODE_ATTEMPTS};
use crate::{Clock, GameEngine, MatchError, Room, RoomConfig};

type SharedRoom<E> = Arc<Mutex<Room<E>>>;

/// Creates, looks up, and evicts rooms. One per process, passed by
/// reference to the router — never a hidden singleton, so tests can
/// construct it around a fake clock.
pub struct RoomRegistry<E: GameEngine> {
    rooms: RwLock<HashMap<String, SharedRoom<E>>>,
    config: RoomConfig,
    engine_config: E::Config,
    clock: Arc<dyn Clock>,
}

impl<E: GameEngine> RoomRegistry<E> {
    pub fn new(
        config: RoomConfig,
        engine_config: E::Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config: config.validated(),
            engine_config,
            clock,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Number of live rooms (including any not yet swept past their TTL).
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    // -- create / join ----------------------------------------------------

    /// Creates a room with the caller as host, minting their session.
    pub async fn create(
        &self,
        host_name: String,
        preferred_code: Option<String>,
        mode: Option<String>,
    ) -> Result<(Snapshot<E::State>, SessionInfo), MatchError> {
        let now_ms = self.clock.now_ms();
        let mut rooms = self.rooms.write().await;

        // Opportunistic sweep so dead rooms don't hold capacity.
        rooms.retain(|code, room| {
            let keep = room
                .try_lock()
                .map(|r| now_ms.saturating_sub(r.updated_at_ms) <= self.config.room_ttl_ms)
                .unwrap_or(true);
            if !keep {
                tracing::info!(room = %code, "evicting expired room during create");
            }
            keep
        });

        if rooms.len() >= self.config.max_rooms {
            return Err(MatchError::RoomCapacityReached);
        }

        // An empty preferred code (after normalization) is treated as absent.
        let preferred = preferred_code
            .map(|p| normalize(&p))
            .filter(|code| !code.is_empty());
        let code = match preferred {
            Some(code) => {
                if rooms.contains_key(&code) {
                    return Err(MatchError::RoomCodeInUse);
                }
                code
            }
            None => (0..MAX_CODE_ATTEMPTS)
                .map(|_| random_code())
                .find(|candidate| !rooms.contains_key(candidate))
                .ok_or(MatchError::RoomCodeUnavailable)?,
        };

        let token = SessionToken::mint();
        let room = Room::new(
            code.clone(),
            mode.unwrap_or_else(|| "standard".to_string()),
            host_name,
            token.clone(),
            &self.engine_config,
            now_ms,
        );
        let session = SessionInfo {
            room_code: code.clone(),
            player_id: PlayerSlot::P1,
            token: token.expose().to_string(),
        };
        let snapshot = compose_snapshot(&room, now_ms);
        rooms.insert(code.clone(), Arc::new(Mutex::new(room)));
        tracing::info!(room = %code, rooms = rooms.len(), "room created");

        Ok((snapshot, session))
    }

    /// Joins (or reclaims) the P2 slot, minting the guest session.
    pub async fn join(
        &self,
        room_code: &str,
        name: String,
    ) -> Result<(Snapshot<E::State>, SessionInfo), MatchError> {
        let shared = self.lookup(room_code).await?;
        let mut room = shared.lock().await;
        let now_ms = self.clock.now_ms();

        room.reconcile_presence(now_ms, &self.config);
        let token = SessionToken::mint();
        let slot = room.join(name, token.clone(), now_ms)?;
        let session = SessionInfo {
            room_code: room.code.clone(),
            player_id: slot,
            token: token.expose().to_string(),
        };
        tracing::info!(room = %room.code, "player joined");

        room.reconcile_presence(now_ms, &self.config);
        room.advance_clock(now_ms);
        room.touch(now_ms);
        Ok((compose_snapshot(&room, now_ms), session))
    }

    // -- authenticated operations -----------------------------------------

    /// Sets the caller's ready flag.
    pub async fn set_ready(
        &self,
        room_code: &str,
        token: &str,
        ready: bool,
    ) -> Result<Snapshot<E::State>, MatchError> {
        self.with_room(room_code, token, |room, slot, now_ms| {
            room.set_ready(slot, ready, now_ms)
        })
        .await
        .map(|(snapshot, ())| snapshot)
    }

    /// Starts the match (host only).
    pub async fn start(
        &self,
        room_code: &str,
        token: &str,
    ) -> Result<Snapshot<E::State>, MatchError> {
        self.with_room(room_code, token, |room, slot, now_ms| {
            room.start(slot, now_ms)
        })
        .await
        .map(|(snapshot, ())| snapshot)
    }

    /// The polling endpoint: no domain mutation beyond the universal
    /// presence/clock reconciliation.
    pub async fn state(
        &self,
        room_code: &str,
        token: &str,
    ) -> Result<Snapshot<E::State>, MatchError> {
        self.with_room(room_code, token, |_room, _slot, _now_ms| Ok(()))
            .await
            .map(|(snapshot, ())| snapshot)
    }

    /// Gateways an action into the engine.
    pub async fn action(
        &self,
        room_code: &str,
        token: &str,
        payload: serde_json::Value,
    ) -> Result<(Snapshot<E::State>, ActionResult), MatchError> {
        self.with_room(room_code, token, |room, slot, now_ms| {
            room.apply_action(slot, payload, now_ms)
        })
        .await
    }

    /// Appends a chat message.
    pub async fn chat(
        &self,
        room_code: &str,
        token: &str,
        text: &str,
    ) -> Result<(Snapshot<E::State>, ChatMessage), MatchError> {
        self.with_room(room_code, token, |room, slot, now_ms| {
            room.append_chat(slot, text, now_ms)
        })
        .await
    }

    // -- shared pipeline --------------------------------------------------

    /// Resolves a room by code, evicting it first if its TTL has lapsed.
    async fn lookup(&self, room_code: &str) -> Result<SharedRoom<E>, MatchError> {
        let code = normalize(room_code);
        let shared = {
            let rooms = self.rooms.read().await;
            rooms.get(&code).cloned()
        }
        .ok_or(MatchError::RoomNotFound)?;

        let idle_ms = {
            let room = shared.lock().await;
            self.clock.now_ms().saturating_sub(room.updated_at_ms)
        };
        if idle_ms > self.config.room_ttl_ms {
            self.rooms.write().await.remove(&code);
            tracing::info!(room = %code, idle_ms, "room expired, evicted on access");
            return Err(MatchError::RoomExpired { idle_ms });
        }
        Ok(shared)
    }

    /// The control flow every authenticated call shares: resolve → authorize
    /// → heartbeat → reconcile presence → operation → reconcile again →
    /// advance clock → refresh TTL → compose snapshot.
    async fn with_room<T>(
        &self,
        room_code: &str,
        token: &str,
        op: impl FnOnce(&mut Room<E>, PlayerSlot, u64) -> Result<T, MatchError>,
    ) -> Result<(Snapshot<E::State>, T), MatchError> {
        let shared = self.lookup(room_code).await?;
        let mut room = shared.lock().await;
        let now_ms = self.clock.now_ms();

        let slot = room.authorize(token)?;
        room.heartbeat(slot, now_ms);
        room.reconcile_presence(now_ms, &self.config);

        let out = op(&mut room, slot, now_ms)?;

        room.reconcile_presence(now_ms, &self.config);
        room.advance_clock(now_ms);
        room.touch(now_ms);
        Ok((compose_snapshot(&room, now_ms), out))
    }
}

/// Builds the composed outbound view: lobby projection + simulation state +
/// transcript.
fn compose_snapshot<E: GameEngine>(room: &Room<E>, now_ms: u64) -> Snapshot<E::State> {
    Snapshot {
        server_now_ms: now_ms,
        lobby: room.lobby_snapshot(),
        state: Some(room.engine.state()),
        chat: room.chat().cloned().collect(),
    }
}
