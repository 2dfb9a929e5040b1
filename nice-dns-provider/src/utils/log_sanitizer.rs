//! Log sanitization utilities
//!
//! Keeps response documents and signing material from being dumped into
//! debug logs in full.

/// Maximum number of bytes of a body included in a log line.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of a credential kept visible.
const VISIBLE_KEY_PREFIX: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a response body or canonical request for logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential, keeping only a short prefix (`AKIA****`).
pub fn mask_key(key: &str) -> String {
    let keep = floor_char_boundary(key, VISIBLE_KEY_PREFIX.min(key.len() / 2));
    format!("{}****", &key[..keep])
}
