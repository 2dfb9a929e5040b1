//! 域名名称处理
//!
//! Providers return fully-qualified names with a trailing dot and escape
//! characters outside `[a-z0-9-_]` as three-digit octal sequences (`\052` is
//! `*`). The model stores names without the trailing dot; writes always send
//! exactly one.

use std::borrow::Cow;

/// Strip a single trailing dot, if present.
pub fn remove_trailing_dot(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Return `name` ending in exactly one dot.
pub fn add_trailing_dot(name: &str) -> String {
    format!("{}.", name.trim_end_matches('.'))
}

/// Decode `\ooo` octal escapes (e.g. `\052.example.com` -> `*.example.com`).
///
/// Sequences that are not a backslash followed by three octal digits are left
/// as they are.
pub fn decode_escapes(name: &str) -> Cow<'_, str> {
    if !name.contains('\\') {
        return Cow::Borrowed(name);
    }

    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && let Some(value) = octal_at(bytes, i + 1)
        {
            out.push(value);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

fn octal_at(bytes: &[u8], start: usize) -> Option<u8> {
    let digits = bytes.get(start..start + 3)?;
    let mut value: u32 = 0;
    for d in digits {
        if !(b'0'..=b'7').contains(d) {
            return None;
        }
        value = value * 8 + u32::from(d - b'0');
    }
    u8::try_from(value).ok()
}

/// Canonical form used for comparisons: escapes decoded, one trailing dot
/// removed, ASCII lowercase.
pub fn normalize_name(name: &str) -> String {
    remove_trailing_dot(&decode_escapes(name)).to_ascii_lowercase()
}

/// Whether two names denote the same owner after normalization.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Zone identifiers never contain a label separator; domain names do.
pub fn looks_like_domain(input: &str) -> bool {
    input.contains('.')
}
