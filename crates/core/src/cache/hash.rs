//! Deterministic cache key generation for remote pages.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The request shape of one remote page: everything that changes its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey {
    pub limit: u32,
    pub offset: u32,
    pub include_last_viewed_panel: bool,
}

impl PageKey {
    /// Hex SHA-256 over the ordered request parameters.
    pub fn key(&self) -> String {
        compute_cache_key(self.limit, self.offset, self.include_last_viewed_panel)
    }
}

/// Compute the cache key for a page request.
pub fn compute_cache_key(limit: u32, offset: u32, include_last_viewed_panel: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(limit.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(offset.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(if include_last_viewed_panel { b"panel" as &[u8] } else { b"nopanel" });
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let a = PageKey { limit: 100, offset: 0, include_last_viewed_panel: true };
        let b = PageKey { limit: 100, offset: 0, include_last_viewed_panel: true };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_hash_different_offset() {
        let first = compute_cache_key(100, 0, true);
        let second = compute_cache_key(100, 100, true);
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_different_flags() {
        assert_ne!(compute_cache_key(100, 0, true), compute_cache_key(100, 0, false));
        assert_ne!(compute_cache_key(100, 0, true), compute_cache_key(50, 0, true));
    }

    #[test]
    fn test_fields_do_not_run_together() {
        assert_ne!(compute_cache_key(1, 10, true), compute_cache_key(11, 0, true));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key(100, 0, true);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
