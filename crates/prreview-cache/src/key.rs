//! Cache key derivation (spec §4.4: "SHA-256 hex of
//! `(repoUrl || "|" || branchRef || "|" || modelId || "|" || promptVersion)`").

use sha2::{Digest, Sha256};

/// Derives the cache key for one branch analysis.
#[must_use]
pub fn cache_key(repo_url: &str, branch_ref: &str, model_id: &str, prompt_version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repo_url.as_bytes());
    hasher.update(b"|");
    hasher.update(branch_ref.as_bytes());
    hasher.update(b"|");
    hasher.update(model_id.as_bytes());
    hasher.update(b"|");
    hasher.update(prompt_version.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Shard index for a key, used to spread lock contention across
/// `SHARD_COUNT` independent `RwLock`s rather than a single global mutex
/// (spec §5).
#[must_use]
pub fn shard_index(key: &str, shard_count: usize) -> usize {
    key.as_bytes().first().copied().unwrap_or(0) as usize % shard_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic_and_order_sensitive() {
        let a = cache_key("https://example.com/repo", "main", "gpt-5", "v1");
        let b = cache_key("https://example.com/repo", "main", "gpt-5", "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let c = cache_key("https://example.com/repo", "feature", "gpt-5", "v1");
        assert_ne!(a, c);
    }

    #[test]
    fn shard_index_is_stable_and_in_range() {
        let key = cache_key("repo", "main", "model", "v1");
        let idx = shard_index(&key, 16);
        assert!(idx < 16);
        assert_eq!(idx, shard_index(&key, 16));
    }
}
