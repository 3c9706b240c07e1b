//! Presence & reconnect supervision.
//!
//! Connectivity is derived, not tracked: a player is connected exactly when
//! their last heartbeat is recent enough, evaluated lazily on every room
//! access. There are no per-player timers. The pause/forfeit machinery only
//! engages while the match is running.

use matchgate_protocol::PlayerSlot;

use crate::room::Presence;
use crate::{GameEngine, Room, RoomConfig};

impl<E: GameEngine> Room<E> {
    /// Reconciles connectivity and pause/forfeit state against `now_ms`.
    ///
    /// Runs before and after every domain operation. The sequence:
    ///
    /// 1. Demote players whose `last_seen_ms` is older than the reconnect
    ///    pause window; promote the rest.
    /// 2. If the engine already ended, clear any stale pause bookkeeping
    ///    and stop — a finished match never re-derives a forfeit.
    /// 3. Before start, connectivity flags are all that matters; the room
    ///    never pauses (a host who never returns just idles to TTL
    ///    eviction).
    /// 4. While running: no stale player clears the pause; a stale player
    ///    opens (or keeps) the pause window — the window is only refreshed
    ///    when the *identity* of the disconnected player changes; a window
    ///    that has elapsed forces the system-authored forfeit through the
    ///    normal action entrypoint and clears the bookkeeping.
    pub fn reconcile_presence(&mut self, now_ms: u64, cfg: &RoomConfig) {
        let pause_ms = cfg.reconnect_pause_ms;

        self.p1.connected = now_ms.saturating_sub(self.p1.last_seen_ms) <= pause_ms;
        if let Some(p2) = &mut self.p2 {
            p2.connected = now_ms.saturating_sub(p2.last_seen_ms) <= pause_ms;
        }

        if self.engine.has_ended() {
            if self.presence != Presence::Active {
                self.presence = Presence::Active;
                self.engine.set_paused(false);
            }
            return;
        }

        if !self.started {
            self.presence = Presence::Active;
            return;
        }

        match self.stalest_disconnected() {
            None => {
                if self.presence != Presence::Active {
                    tracing::info!(room = %self.code, "all players back, resuming");
                    self.presence = Presence::Active;
                    self.engine.set_paused(false);
                }
            }
            Some(stale) => {
                let deadline_ms = match self.presence {
                    // Same player still gone: keep the original window.
                    Presence::Paused { who, deadline_ms, .. } if who == stale => {
                        deadline_ms
                    }
                    // New (or newly-different) disconnect: open a fresh window.
                    _ => {
                        let deadline_ms = now_ms + pause_ms;
                        tracing::info!(
                            room = %self.code,
                            player = %stale,
                            deadline_ms,
                            "player disconnected, match paused"
                        );
                        self.presence = Presence::Paused {
                            who: stale,
                            since_ms: now_ms,
                            deadline_ms,
                        };
                        self.engine.set_paused(true);
                        deadline_ms
                    }
                };

                if now_ms >= deadline_ms {
                    self.force_forfeit(stale);
                }
            }
        }
    }

    /// The disconnected player the pause is attributed to. With both slots
    /// stale (rare), the longer-disconnected one wins so the window is not
    /// reshuffled between them.
    fn stalest_disconnected(&self) -> Option<PlayerSlot> {
        let mut stale: Option<(PlayerSlot, u64)> = None;
        if !self.p1.connected {
            stale = Some((PlayerSlot::P1, self.p1.last_seen_ms));
        }
        if let Some(p2) = &self.p2 {
            if !p2.connected && stale.is_none_or(|(_, seen)| p2.last_seen_ms < seen) {
                stale = Some((PlayerSlot::P2, p2.last_seen_ms));
            }
        }
        stale.map(|(slot, _)| slot)
    }

    /// Applies the terminal concession on behalf of the vanished player and
    /// clears the pause bookkeeping. The match proceeds in the engine's
    /// ended state.
    fn force_forfeit(&mut self, slot: PlayerSlot) {
        tracing::info!(
            room = %self.code,
            player = %slot,
            "pause window elapsed, forfeiting disconnected player"
        );
        self.engine.apply_action(slot, E::forfeit_action(slot));
        self.presence = Presence::Active;
        self.engine.set_paused(false);
    }
}
