//! Integration tests for the room system using a mock engine.

use std::sync::Arc;

use matchgate_protocol::{ActionResult, PlayerSlot, SessionInfo, Snapshot};
use matchgate_room::{
    FakeClock, GameEngine, MatchError, RoomConfig, RoomRegistry, CODE_ALPHABET,
    CODE_LEN,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

// =========================================================================
// Mock engine: a gather counter with explicit concession.
// =========================================================================

#[derive(Clone, Default)]
struct MockConfig;

#[derive(Clone, Debug, Serialize)]
struct MockState {
    paused: bool,
    ended: bool,
    forfeited_by: Option<PlayerSlot>,
    elapsed_ms: u64,
    gathered: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum MockAction {
    Gather { amount: u32 },
    Concede { slot: PlayerSlot },
}

struct MockEngine {
    state: MockState,
}

impl GameEngine for MockEngine {
    type Config = MockConfig;
    type Action = MockAction;
    type State = MockState;

    fn init(_: &MockConfig) -> Self {
        Self {
            state: MockState {
                paused: false,
                ended: false,
                forfeited_by: None,
                elapsed_ms: 0,
                gathered: 0,
            },
        }
    }

    fn validate_action(&self, action: &MockAction) -> Result<(), String> {
        match action {
            MockAction::Gather { amount } if *amount == 0 || *amount > 5 => {
                Err("amount must be 1-5".into())
            }
            _ => Ok(()),
        }
    }

    fn apply_action(&mut self, _actor: PlayerSlot, action: MockAction) -> ActionResult {
        match action {
            MockAction::Gather { amount } => {
                self.state.gathered += amount;
                ActionResult::accepted()
            }
            MockAction::Concede { slot } => {
                self.state.ended = true;
                self.state.forfeited_by = Some(slot);
                ActionResult::accepted()
            }
        }
    }

    fn forfeit_action(slot: PlayerSlot) -> MockAction {
        MockAction::Concede { slot }
    }

    fn tick(&mut self, delta_ms: u64) {
        if !self.state.paused && !self.state.ended {
            self.state.elapsed_ms += delta_ms;
        }
    }

    fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    fn has_ended(&self) -> bool {
        self.state.ended
    }

    fn state(&self) -> MockState {
        self.state.clone()
    }
}

// =========================================================================
// Helpers
// =========================================================================

const PAUSE_MS: u64 = 90_000;
const TTL_MS: u64 = 6 * 60 * 60 * 1000;

fn registry() -> (Arc<FakeClock>, RoomRegistry<MockEngine>) {
    registry_with(RoomConfig::default())
}

fn registry_with(config: RoomConfig) -> (Arc<FakeClock>, RoomRegistry<MockEngine>) {
    let clock = Arc::new(FakeClock::new(1_000_000));
    let reg = RoomRegistry::new(config, MockConfig, clock.clone());
    (clock, reg)
}

/// Creates a room and joins a guest; returns both sessions.
async fn full_room(reg: &RoomRegistry<MockEngine>) -> (SessionInfo, SessionInfo) {
    let (_, host) = reg
        .create("host".into(), None, None)
        .await
        .expect("create should succeed");
    let (_, guest) = reg
        .join(&host.room_code, "guest".into())
        .await
        .expect("join should succeed");
    (host, guest)
}

/// Readies both players and starts the match from the host.
async fn started_room(
    reg: &RoomRegistry<MockEngine>,
) -> (SessionInfo, SessionInfo) {
    let (host, guest) = full_room(reg).await;
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();
    reg.set_ready(&guest.room_code, &guest.token, true).await.unwrap();
    let snapshot = reg.start(&host.room_code, &host.token).await.unwrap();
    assert!(snapshot.lobby.started);
    (host, guest)
}

fn state_of(snapshot: &Snapshot<MockState>) -> &MockState {
    snapshot.state.as_ref().expect("snapshot carries engine state")
}

// =========================================================================
// Room codes & creation
// =========================================================================

#[tokio::test]
async fn test_create_mints_host_session_and_code() {
    let (_, reg) = registry();
    let (snapshot, session) = reg.create("host".into(), None, None).await.unwrap();

    assert_eq!(session.player_id, PlayerSlot::P1);
    assert_eq!(session.token.len(), 32);
    assert_eq!(session.room_code.len(), CODE_LEN);
    assert!(session
        .room_code
        .bytes()
        .all(|b| CODE_ALPHABET.contains(&b)));
    assert_eq!(snapshot.lobby.room_code, session.room_code);
    assert!(!snapshot.lobby.started);
    assert_eq!(snapshot.lobby.mode, "standard");
}

#[tokio::test]
async fn test_create_honors_preferred_code() {
    let (_, reg) = registry();
    let (_, session) = reg
        .create("host".into(), Some("abc234".into()), None)
        .await
        .unwrap();
    // Normalized to uppercase for lookup.
    assert_eq!(session.room_code, "ABC234");
}

#[tokio::test]
async fn test_create_blank_preferred_code_falls_back_to_random() {
    let (_, reg) = registry();
    let (_, session) = reg
        .create("host".into(), Some("   ".into()), None)
        .await
        .unwrap();
    // A code that normalizes to nothing must not key a room by the empty
    // string; the allocator draws a random one instead.
    assert_eq!(session.room_code.len(), CODE_LEN);
    assert!(session
        .room_code
        .bytes()
        .all(|b| CODE_ALPHABET.contains(&b)));
}

#[tokio::test]
async fn test_create_rejects_taken_preferred_code() {
    let (_, reg) = registry();
    reg.create("a".into(), Some("ABC234".into()), None).await.unwrap();
    let result = reg.create("b".into(), Some("ABC234".into()), None).await;
    assert!(matches!(result, Err(MatchError::RoomCodeInUse)));
}

#[tokio::test]
async fn test_no_two_live_rooms_share_a_code() {
    let (_, reg) = registry();
    let mut codes = std::collections::HashSet::new();
    for _ in 0..50 {
        let (_, session) = reg.create("host".into(), None, None).await.unwrap();
        assert!(codes.insert(session.room_code), "duplicate code issued");
    }
}

#[tokio::test]
async fn test_create_rejects_at_capacity() {
    let (_, reg) = registry_with(RoomConfig {
        max_rooms: 2,
        ..RoomConfig::default()
    });
    reg.create("a".into(), None, None).await.unwrap();
    reg.create("b".into(), None, None).await.unwrap();

    let result = reg.create("c".into(), None, None).await;
    assert!(matches!(result, Err(MatchError::RoomCapacityReached)));
}

#[tokio::test]
async fn test_create_sweeps_expired_rooms_before_capacity_check() {
    let (clock, reg) = registry_with(RoomConfig {
        max_rooms: 1,
        ..RoomConfig::default()
    });
    reg.create("a".into(), None, None).await.unwrap();

    // The only room goes stale; the next create reclaims its capacity.
    clock.advance(TTL_MS + 1);
    reg.create("b".into(), None, None)
        .await
        .expect("expired room should be swept");
    assert_eq!(reg.room_count().await, 1);
}

// =========================================================================
// Lobby: join / ready / start
// =========================================================================

#[tokio::test]
async fn test_join_assigns_p2_and_name_is_visible() {
    let (_, reg) = registry();
    let (_, host) = reg.create("host".into(), None, None).await.unwrap();

    let (snapshot, guest) = reg.join(&host.room_code, "guest".into()).await.unwrap();

    assert_eq!(guest.player_id, PlayerSlot::P2);
    assert_ne!(guest.token, host.token);
    let p2 = snapshot.lobby.players.p2.as_ref().expect("P2 seated");
    assert_eq!(p2.name, "guest");
    assert!(p2.connected);
}

#[tokio::test]
async fn test_join_full_room_rejected() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let result = reg.join(&host.room_code, "third".into()).await;
    assert!(matches!(result, Err(MatchError::RoomFull)));
}

#[tokio::test]
async fn test_join_unknown_room_not_found() {
    let (_, reg) = registry();
    let result = reg.join("ZZZZZZ", "guest".into()).await;
    assert!(matches!(result, Err(MatchError::RoomNotFound)));
}

#[tokio::test]
async fn test_join_replaces_disconnected_p2() {
    let (clock, reg) = registry();
    let (host, old_guest) = full_room(&reg).await;

    // Guest goes silent past the pause window; host stays fresh.
    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();

    let (snapshot, new_guest) = reg
        .join(&host.room_code, "replacement".into())
        .await
        .expect("stale P2 should be replaceable");

    assert_eq!(new_guest.player_id, PlayerSlot::P2);
    assert_ne!(new_guest.token, old_guest.token);
    let p2 = snapshot.lobby.players.p2.as_ref().unwrap();
    assert_eq!(p2.name, "replacement");
    assert!(!p2.ready, "replacement starts unready");

    // The replaced player's token is dead.
    let result = reg.state(&host.room_code, &old_guest.token).await;
    assert!(matches!(result, Err(MatchError::Unauthorized)));
}

#[tokio::test]
async fn test_ready_is_idempotent() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let first = reg.set_ready(&host.room_code, &host.token, true).await.unwrap();
    let second = reg.set_ready(&host.room_code, &host.token, true).await.unwrap();

    assert!(first.lobby.players.p1.ready);
    assert!(second.lobby.players.p1.ready);

    let cleared = reg.set_ready(&host.room_code, &host.token, false).await.unwrap();
    assert!(!cleared.lobby.players.p1.ready);
}

#[tokio::test]
async fn test_start_requires_host() {
    let (_, reg) = registry();
    let (host, guest) = full_room(&reg).await;
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();
    reg.set_ready(&guest.room_code, &guest.token, true).await.unwrap();

    let result = reg.start(&guest.room_code, &guest.token).await;
    assert!(matches!(result, Err(MatchError::OnlyHostCanStart)));
}

#[tokio::test]
async fn test_start_requires_second_player() {
    let (_, reg) = registry();
    let (_, host) = reg.create("host".into(), None, None).await.unwrap();
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();

    let result = reg.start(&host.room_code, &host.token).await;
    assert!(matches!(result, Err(MatchError::PlayerTwoNotJoined)));
}

#[tokio::test]
async fn test_start_requires_both_ready() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();

    let result = reg.start(&host.room_code, &host.token).await;
    assert!(matches!(result, Err(MatchError::BothPlayersMustBeReady)));
}

#[tokio::test]
async fn test_start_success_is_permanent_and_repeat_is_noop() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    // A second start must not reset the tick baseline.
    clock.advance(3_000);
    let snapshot = reg.start(&host.room_code, &host.token).await.unwrap();
    assert!(snapshot.lobby.started);
    assert_eq!(state_of(&snapshot).elapsed_ms, 3_000);
}

// =========================================================================
// Match clock / tick bridge
// =========================================================================

#[tokio::test]
async fn test_no_simulation_time_accumulates_in_lobby() {
    let (clock, reg) = registry();
    let (host, guest) = full_room(&reg).await;

    // A long lobby wait must not become one giant first tick.
    clock.advance(600_000);
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();
    reg.set_ready(&guest.room_code, &guest.token, true).await.unwrap();
    let snapshot = reg.start(&host.room_code, &host.token).await.unwrap();
    assert_eq!(state_of(&snapshot).elapsed_ms, 0);
}

#[tokio::test]
async fn test_clock_advances_once_per_access() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(5_000);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();
    assert_eq!(state_of(&snapshot).elapsed_ms, 5_000);

    // Zero-delta re-entry is idempotent.
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();
    assert_eq!(state_of(&snapshot).elapsed_ms, 5_000);
}

// =========================================================================
// Presence, pause, forfeit
// =========================================================================

#[tokio::test]
async fn test_short_silence_never_pauses() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS - 1);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();

    assert!(snapshot.lobby.disconnected_player_id.is_none());
    assert!(!state_of(&snapshot).paused);
}

#[tokio::test]
async fn test_stale_player_pauses_within_one_access() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();

    assert_eq!(snapshot.lobby.disconnected_player_id, Some(PlayerSlot::P2));
    let now = snapshot.server_now_ms;
    assert_eq!(snapshot.lobby.paused_at_ms, Some(now));
    assert_eq!(snapshot.lobby.timeout_at_ms, Some(now + PAUSE_MS));
    assert!(state_of(&snapshot).paused);
}

#[tokio::test]
async fn test_pause_window_not_reset_for_same_player() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    let first = reg.state(&host.room_code, &host.token).await.unwrap();
    let deadline = first.lobby.timeout_at_ms.unwrap();

    clock.advance(10_000);
    let second = reg.state(&host.room_code, &host.token).await.unwrap();
    assert_eq!(
        second.lobby.timeout_at_ms,
        Some(deadline),
        "same stale player must keep the original window"
    );
}

#[tokio::test]
async fn test_pause_blocks_actions_and_ready() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();

    let action = reg
        .action(&host.room_code, &host.token, json!({"type":"gather","amount":1}))
        .await;
    assert!(matches!(action, Err(MatchError::MatchPaused { .. })));

    let ready = reg.set_ready(&host.room_code, &host.token, true).await;
    match ready {
        Err(MatchError::MatchPaused { remaining_ms }) => {
            assert!(remaining_ms <= PAUSE_MS);
        }
        other => panic!("expected MatchPaused, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reconnect_before_deadline_clears_pause() {
    let (clock, reg) = registry();
    let (host, guest) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();

    // The vanished player comes back — their own call is the heartbeat.
    let snapshot = reg.state(&guest.room_code, &guest.token).await.unwrap();
    assert!(snapshot.lobby.disconnected_player_id.is_none());
    assert!(!state_of(&snapshot).paused);
    assert!(!state_of(&snapshot).ended);
}

#[tokio::test]
async fn test_deadline_forces_forfeit_of_disconnected_player() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();

    // Let the pause window itself elapse.
    clock.advance(PAUSE_MS + 1);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();

    assert!(snapshot.lobby.disconnected_player_id.is_none());
    assert!(snapshot.lobby.paused_at_ms.is_none());
    let state = state_of(&snapshot);
    assert!(state.ended);
    assert_eq!(state.forfeited_by, Some(PlayerSlot::P2));
    assert!(!state.paused);
}

#[tokio::test]
async fn test_ended_match_never_rederives_forfeit_or_pause() {
    let (clock, reg) = registry();
    let (host, _) = started_room(&reg).await;

    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();
    clock.advance(PAUSE_MS + 1);
    reg.state(&host.room_code, &host.token).await.unwrap();

    // P2 stays gone long after the forfeit; nothing re-pauses.
    clock.advance(10 * PAUSE_MS);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();
    assert!(snapshot.lobby.disconnected_player_id.is_none());
    assert_eq!(state_of(&snapshot).forfeited_by, Some(PlayerSlot::P2));
}

#[tokio::test]
async fn test_no_pause_before_start() {
    let (clock, reg) = registry();
    let (host, _guest) = full_room(&reg).await;

    // Guest silent well past the window, but the match never started:
    // connectivity drops, no pause machinery engages.
    clock.advance(PAUSE_MS + 1);
    let snapshot = reg.state(&host.room_code, &host.token).await.unwrap();

    assert!(snapshot.lobby.disconnected_player_id.is_none());
    let p2 = snapshot.lobby.players.p2.as_ref().unwrap();
    assert!(!p2.connected);
}

// =========================================================================
// Action gateway
// =========================================================================

#[tokio::test]
async fn test_action_before_start_rejected() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let result = reg
        .action(&host.room_code, &host.token, json!({"type":"gather","amount":1}))
        .await;
    assert!(matches!(result, Err(MatchError::MatchNotStarted)));
}

#[tokio::test]
async fn test_action_schema_failure_leaves_engine_untouched() {
    let (_, reg) = registry();
    let (host, _) = started_room(&reg).await;

    let (snapshot, result) = reg
        .action(&host.room_code, &host.token, json!({"type":"swim"}))
        .await
        .unwrap();

    assert!(!result.ok);
    assert_eq!(result.code.as_deref(), Some("INVALID_ACTION"));
    assert_eq!(state_of(&snapshot).gathered, 0);
}

#[tokio::test]
async fn test_action_validator_rejection_is_invalid_action() {
    let (_, reg) = registry();
    let (host, _) = started_room(&reg).await;

    let (snapshot, result) = reg
        .action(&host.room_code, &host.token, json!({"type":"gather","amount":99}))
        .await
        .unwrap();

    assert!(!result.ok);
    assert_eq!(result.code.as_deref(), Some("INVALID_ACTION"));
    assert_eq!(state_of(&snapshot).gathered, 0);
}

#[tokio::test]
async fn test_valid_action_applies_to_engine() {
    let (_, reg) = registry();
    let (host, guest) = started_room(&reg).await;

    let (_, result) = reg
        .action(&host.room_code, &host.token, json!({"type":"gather","amount":3}))
        .await
        .unwrap();
    assert!(result.ok);

    let (snapshot, result) = reg
        .action(&guest.room_code, &guest.token, json!({"type":"gather","amount":2}))
        .await
        .unwrap();
    assert!(result.ok);
    assert_eq!(state_of(&snapshot).gathered, 5);
}

// =========================================================================
// Chat relay
// =========================================================================

#[tokio::test]
async fn test_chat_appends_in_order() {
    let (_, reg) = registry();
    let (host, guest) = full_room(&reg).await;

    reg.chat(&host.room_code, &host.token, "first").await.unwrap();
    let (snapshot, _) = reg.chat(&guest.room_code, &guest.token, "second").await.unwrap();

    assert_eq!(snapshot.chat.len(), 2);
    assert_eq!(snapshot.chat[0].text, "first");
    assert_eq!(snapshot.chat[0].author_name, "host");
    assert_eq!(snapshot.chat[1].text, "second");
    assert_eq!(snapshot.chat[1].author, PlayerSlot::P2);
}

#[tokio::test]
async fn test_chat_transcript_keeps_newest_100() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let mut last = None;
    for i in 0..150 {
        let (snapshot, _) = reg
            .chat(&host.room_code, &host.token, &format!("msg {i}"))
            .await
            .unwrap();
        last = Some(snapshot);
    }

    let snapshot = last.unwrap();
    assert_eq!(snapshot.chat.len(), 100);
    assert_eq!(snapshot.chat[0].text, "msg 50");
    assert_eq!(snapshot.chat[99].text, "msg 149");
    // Arrival order preserved across the truncation.
    for pair in snapshot.chat.windows(2) {
        assert!(pair[0].id < pair[1].id);
    }
}

#[tokio::test]
async fn test_chat_rejects_empty_after_sanitizing() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let result = reg.chat(&host.room_code, &host.token, "  \r\n ").await;
    assert!(matches!(result, Err(MatchError::InvalidChatMessage)));
}

#[tokio::test]
async fn test_chat_works_before_and_after_start() {
    let (_, reg) = registry();
    let (host, _) = started_room(&reg).await;

    let (snapshot, message) = reg
        .chat(&host.room_code, &host.token, "gg")
        .await
        .unwrap();
    assert_eq!(message.text, "gg");
    assert!(snapshot.lobby.started);
}

// =========================================================================
// Authorization & state reads
// =========================================================================

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;

    let result = reg.state(&host.room_code, "not-a-token").await;
    assert!(matches!(result, Err(MatchError::Unauthorized)));
}

#[tokio::test]
async fn test_state_mutates_nothing_but_presence_and_clock() {
    let (_, reg) = registry();
    let (host, _) = full_room(&reg).await;
    reg.set_ready(&host.room_code, &host.token, true).await.unwrap();

    let before = reg.state(&host.room_code, &host.token).await.unwrap();
    let after = reg.state(&host.room_code, &host.token).await.unwrap();

    assert_eq!(before.lobby.started, after.lobby.started);
    assert_eq!(before.lobby.players.p1.ready, after.lobby.players.p1.ready);
    assert_eq!(before.chat.len(), after.chat.len());
    assert_eq!(state_of(&before).gathered, state_of(&after).gathered);
}

// =========================================================================
// TTL eviction
// =========================================================================

#[tokio::test]
async fn test_ttl_expires_idle_room_on_access() {
    let (clock, reg) = registry();
    let (host, _) = full_room(&reg).await;

    clock.advance(TTL_MS + 1);
    let result = reg.state(&host.room_code, &host.token).await;
    match result {
        Err(MatchError::RoomExpired { idle_ms }) => assert!(idle_ms > TTL_MS),
        other => panic!("expected RoomExpired, got {other:?}"),
    }

    // Evicted for good: the next lookup no longer finds it.
    let result = reg.state(&host.room_code, &host.token).await;
    assert!(matches!(result, Err(MatchError::RoomNotFound)));
    assert_eq!(reg.room_count().await, 0);
}

#[tokio::test]
async fn test_traffic_refreshes_ttl() {
    let (clock, reg) = registry();
    let (host, _) = full_room(&reg).await;

    // Keep touching the room just inside the TTL; it must survive.
    for _ in 0..3 {
        clock.advance(TTL_MS - 1);
        reg.state(&host.room_code, &host.token).await.unwrap();
    }
}
