//! The `GameEngine` trait — the boundary to the deterministic simulation.
//!
//! The room authority never knows game rules. It owns one engine instance
//! per room and drives it through this trait: actions in, ticks in, state
//! snapshots out. Everything else (tile economy, seasons, win conditions)
//! lives behind the boundary.

use matchgate_protocol::{ActionResult, PlayerSlot};
use serde::{de::DeserializeOwned, Serialize};

/// The simulation engine owned by each room.
///
/// Associated types define the engine's data shapes:
/// - `Config` — engine settings applied at room creation
/// - `Action` — what players submit (deserialized from the opaque wire
///   payload by the action gateway)
/// - `State` — the full simulation state included in snapshots
pub trait GameEngine: Send + 'static {
    /// Engine settings (map size, season length, etc.).
    type Config: Clone + Send + Sync + Default;

    /// A player-submitted action. The gateway deserializes the wire payload
    /// into this type; a failure there is the schema-validation rejection.
    type Action: DeserializeOwned + Send;

    /// The full simulation state, serialized into every snapshot.
    type State: Serialize + Clone + Send;

    /// Creates a fresh match. Called once when a room is created.
    fn init(config: &Self::Config) -> Self;

    /// Validates a well-formed action before it is applied.
    ///
    /// This is shape/range checking only — game-rule rejections belong in
    /// [`apply_action`](Self::apply_action). Default: accept everything.
    fn validate_action(&self, _action: &Self::Action) -> Result<(), String> {
        Ok(())
    }

    /// Applies an action attributed to `actor` and returns the engine's
    /// verdict verbatim. The actor slot is always injected by the server,
    /// never read from the payload.
    fn apply_action(&mut self, actor: PlayerSlot, action: Self::Action) -> ActionResult;

    /// Builds the system-authored concession for `slot`.
    ///
    /// When a disconnected player's pause window elapses, the supervisor
    /// applies this through [`apply_action`](Self::apply_action) on their
    /// behalf — the same entrypoint player actions use, so engine state
    /// transitions stay uniform.
    fn forfeit_action(slot: PlayerSlot) -> Self::Action;

    /// Advances simulation time by a wall-clock delta. Never called with a
    /// negative delta; a paused or ended engine treats this as a no-op.
    fn tick(&mut self, delta_ms: u64);

    /// Freezes or resumes the simulation while a disconnect is pending.
    fn set_paused(&mut self, paused: bool);

    /// Whether the match has reached a terminal state.
    fn has_ended(&self) -> bool;

    /// The current simulation state for snapshot composition.
    fn state(&self) -> Self::State;
}
