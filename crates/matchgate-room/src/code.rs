//! Room code generation.
//!
//! Codes are short, human-shareable, and drawn from an alphabet that
//! excludes visually ambiguous characters (no `0`/`O`, no `1`/`I`).

use rand::Rng;

/// 32 unambiguous characters.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Fixed code length.
pub const CODE_LEN: usize = 6;

/// Random draws before the allocator gives up with `ROOM_CODE_UNAVAILABLE`.
/// Exhaustion is astronomically unlikely below capacity (32^6 codes) but
/// must terminate rather than loop.
pub(crate) const MAX_CODE_ATTEMPTS: usize = 40;

/// Draws one random code.
pub(crate) fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalizes a client-supplied code for lookup: trimmed, uppercased.
pub(crate) fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
