//! Token minting and comparison.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An unguessable per-player session secret.
///
/// 32 lowercase hex characters — 128 bits of entropy, enough that guessing a
/// live token within a room's lifetime is computationally infeasible.
/// Comparison is exact-match only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mints a fresh random token.
    pub fn mint() -> Self {
        let mut rng = rand::rng();
        let bytes: [u8; 16] = rng.random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Exact-match verification against a client-presented string.
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented
    }

    /// The token as a string, for handing back to the client once at mint
    /// time. Never logged.
    pub fn expose(&self) -> &str {
        &self.0
    }
}
