//! Session tokens for Matchgate.
//!
//! A session token is an opaque per-player secret minted at create/join time.
//! Possession of the token is the sole authorization mechanism for every
//! subsequent call on a room — there is no other credential. Tokens are never
//! reused across rooms or slots.

mod token;

pub use token::SessionToken;
