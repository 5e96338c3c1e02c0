//! BLAKE3 hashing utilities for cache content addressing

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the prefixed BLAKE3 hash of some content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}

/// File name for a content hash, without the prefix
pub fn blob_name(hash: &str) -> &str {
    hash.strip_prefix(HASH_PREFIX).unwrap_or(hash)
}

/// Verify content against a hash, accepting hashes with or without prefix
pub fn verify_content(expected: &str, content: &[u8]) -> bool {
    blob_name(expected) == blob_name(&hash_content(content))
}
