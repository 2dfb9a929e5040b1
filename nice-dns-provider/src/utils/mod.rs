//! Utility modules.

/// RFC 3339 timestamp helpers shared by the model and the normalizer.
pub mod datetime;

/// Domain-name normalization (trailing dot, escape decoding, comparison).
pub mod domain;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
