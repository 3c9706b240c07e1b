//! Meltdown: a small real-time demo game on top of matchgate.
//!
//! Two players race to harvest ice from a shared field of tiles while the
//! field melts in real time. The match ends when the field is empty (higher
//! score wins) or when a player concedes.

use std::sync::Arc;

use matchgate::{GameEngine, RoomConfig, RoomRegistry, ServerConfig, SystemClock};
use matchgate_protocol::{ActionResult, PlayerSlot};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MeltdownConfig {
    /// Number of tiles in the field.
    pub tiles: usize,
    /// Starting ice units per tile.
    pub ice_per_tile: u32,
    /// Units each tile loses per second of real time.
    pub melt_per_sec: u32,
    /// Units one harvest action collects from a tile.
    pub harvest_amount: u32,
}

impl Default for MeltdownConfig {
    fn default() -> Self {
        Self {
            tiles: 16,
            ice_per_tile: 100,
            melt_per_sec: 1,
            harvest_amount: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    Running,
    Finished {
        winner: Option<PlayerSlot>,
        reason: String,
    },
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub p1: u32,
    pub p2: u32,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeltdownState {
    pub paused: bool,
    #[serde(flatten)]
    pub phase: Phase,
    pub tiles: Vec<u32>,
    pub scores: Scores,
    pub elapsed_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MeltdownAction {
    Harvest { tile: usize },
    Concede,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Meltdown {
    config: MeltdownConfig,
    state: MeltdownState,
    /// Sub-second remainder carried between ticks so slow polling still
    /// melts at the configured rate.
    melt_carry_ms: u64,
}

impl Meltdown {
    fn score_mut(&mut self, slot: PlayerSlot) -> &mut u32 {
        match slot {
            PlayerSlot::P1 => &mut self.state.scores.p1,
            PlayerSlot::P2 => &mut self.state.scores.p2,
        }
    }

    fn finish(&mut self, winner: Option<PlayerSlot>, reason: impl Into<String>) {
        self.state.phase = Phase::Finished {
            winner,
            reason: reason.into(),
        };
    }

    fn field_empty(&self) -> bool {
        self.state.tiles.iter().all(|&ice| ice == 0)
    }

    fn finish_if_depleted(&mut self) {
        if !self.field_empty() {
            return;
        }
        let Scores { p1, p2 } = self.state.scores;
        let winner = match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Some(PlayerSlot::P1),
            std::cmp::Ordering::Less => Some(PlayerSlot::P2),
            std::cmp::Ordering::Equal => None,
        };
        self.finish(winner, "field depleted");
    }
}

impl GameEngine for Meltdown {
    type Config = MeltdownConfig;
    type Action = MeltdownAction;
    type State = MeltdownState;

    fn init(config: &MeltdownConfig) -> Self {
        Self {
            config: config.clone(),
            state: MeltdownState {
                paused: false,
                phase: Phase::Running,
                tiles: vec![config.ice_per_tile; config.tiles],
                scores: Scores { p1: 0, p2: 0 },
                elapsed_ms: 0,
            },
            melt_carry_ms: 0,
        }
    }

    fn validate_action(&self, action: &MeltdownAction) -> Result<(), String> {
        if let MeltdownAction::Harvest { tile } = action {
            if *tile >= self.state.tiles.len() {
                return Err(format!(
                    "tile {tile} out of range 0-{}",
                    self.state.tiles.len() - 1
                ));
            }
        }
        Ok(())
    }

    fn apply_action(&mut self, actor: PlayerSlot, action: MeltdownAction) -> ActionResult {
        if matches!(self.state.phase, Phase::Finished { .. }) {
            return ActionResult::rejected("MATCH_FINISHED", "the match is over");
        }
        match action {
            MeltdownAction::Harvest { tile } => {
                let take = self.state.tiles[tile].min(self.config.harvest_amount);
                if take == 0 {
                    return ActionResult::rejected("TILE_EMPTY", "nothing left to harvest");
                }
                self.state.tiles[tile] -= take;
                *self.score_mut(actor) += take;
                self.finish_if_depleted();
                ActionResult::accepted()
            }
            MeltdownAction::Concede => {
                self.finish(Some(actor.other()), format!("{actor} conceded"));
                ActionResult::accepted()
            }
        }
    }

    fn forfeit_action(_slot: PlayerSlot) -> MeltdownAction {
        MeltdownAction::Concede
    }

    fn tick(&mut self, delta_ms: u64) {
        if self.state.paused || matches!(self.state.phase, Phase::Finished { .. }) {
            return;
        }
        self.state.elapsed_ms += delta_ms;
        self.melt_carry_ms += delta_ms;
        while self.melt_carry_ms >= 1_000 {
            self.melt_carry_ms -= 1_000;
            for ice in &mut self.state.tiles {
                *ice = ice.saturating_sub(self.config.melt_per_sec);
            }
        }
        self.finish_if_depleted();
    }

    fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    fn has_ended(&self) -> bool {
        matches!(self.state.phase, Phase::Finished { .. })
    }

    fn state(&self) -> MeltdownState {
        self.state.clone()
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = Arc::new(RoomRegistry::<Meltdown>::new(
        RoomConfig::from_env(),
        MeltdownConfig::default(),
        Arc::new(SystemClock),
    ));
    matchgate::serve(registry, ServerConfig::from_env()).await
}

// ---------------------------------------------------------------------------
// Engine unit tests — deterministic, no server.
// ---------------------------------------------------------------------------
