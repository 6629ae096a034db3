//! Cache key generation for stored requests.

use sha2::{Digest, Sha256};

/// Compute the cache key of a request within a store.
///
/// Headers are not part of the key; `Vary` is checked at match time.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
