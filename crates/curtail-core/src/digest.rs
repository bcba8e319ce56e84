use sha2::{Digest as _, Sha512};
use std::fmt::Display;

/// Number of hash bytes kept for the deduplication key. 256 bits is
/// plenty for URL-length inputs while keeping lookup keys compact.
const DIGEST_BYTES: usize = 32;

/// A fixed-length fingerprint of a long URL.
///
/// Digests are the deduplication key for the `digest -> code` key
/// space. They are internal to the core and never appear in responses.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Returns the digest as a lowercase hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Digest").field(&self.0).finish()
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the deduplication digest of a long URL.
///
/// SHA-512 truncated to its first 32 bytes, hex encoded. Deterministic
/// and infallible; collision resistance is inherited from the full
/// hash.
pub fn url_digest(long_url: &str) -> Digest {
    let hash = Sha512::digest(long_url.as_bytes());
    Digest(hex::encode(&hash[..DIGEST_BYTES]))
}
