//! Content hashing for shared transcripts.
//!
//! The hash is taken over the encoded transcript bytes exactly as they are
//! stored, so a fetched transcript can be checked against the hash recorded
//! in its metadata at export time.

use sha2::{Digest, Sha256};

/// SHA256 of `content`, as 64 lowercase hex characters.
#[must_use]
pub fn content_hash(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{:x}", hasher.finalize())
}

/// Check fetched content against a recorded hash.
///
/// Returns `true` when there is no recorded hash to compare against.
#[must_use]
pub fn hash_matches(content: impl AsRef<[u8]>, recorded: Option<&str>) -> bool {
    recorded.is_none_or(|h| h.eq_ignore_ascii_case(&content_hash(content)))
}
