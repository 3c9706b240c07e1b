//! Chat sanitization and transcript bounds.

/// Maximum sanitized message length in characters.
pub const MAX_CHAT_LEN: usize = 280;

/// Maximum transcript entries per room; oldest entries drop beyond this.
pub const TRANSCRIPT_CAP: usize = 100;

/// Sanitizes raw chat input: trims, normalizes line endings to `\n`, and
/// truncates to [`MAX_CHAT_LEN`] characters (char-safe, never mid-codepoint).
///
/// Returns `None` when nothing remains — the caller rejects that with
/// `INVALID_CHAT_MESSAGE`.
pub fn sanitize_chat(raw: &str) -> Option<String> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_CHAT_LEN).collect())
}
