//! Persistent ID derivation.
//!
//! Tracks are addressed by an ID derived from their path, so the same file
//! keeps its ID across full reindexes and a syncing device can keep its
//! references. Renaming or moving a file changes its ID.

use md5::{Digest, Md5};

/// Number of hex characters kept from the digest.
const PERSISTENT_ID_LEN: usize = 16;

/// Derive the persistent ID for a seed (the track's file path).
///
/// MD5 over the UTF-8 bytes, rendered as uppercase hex and truncated to
/// 16 characters.
pub fn persistent_id(seed: &str) -> String {
    let digest = Md5::digest(seed.as_bytes());
    let mut hex = format!("{:X}", digest);
    hex.truncate(PERSISTENT_ID_LEN);
    hex
}
