//! Content fingerprints for announcement deduplication.

use sha2::{Digest, Sha256};

/// Trim and collapse runs of whitespace to a single space.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 fingerprint of an announcement scoped to its game number.
///
/// Concatenates the game number and the normalized text, then returns the
/// hex-encoded digest.
#[must_use]
pub fn content_hash(game_number: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(game_number.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(normalize_text(text).as_bytes());
    format!("{:x}", hasher.finalize())
}
