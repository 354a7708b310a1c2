//! Deterministic cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request against `endpoint` with the given
/// ordered query parameters.
///
/// Parameter order is significant: callers always pass parameters in the
/// same order for the same endpoint. Every field is length-prefixed so user
/// input cannot forge a different parameter list.
pub fn compute_cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, endpoint);
    for (name, value) in params {
        update_field(&mut hasher, name);
        update_field(&mut hasher, value);
    }
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_key(q: &str, limit: usize, offset: usize) -> String {
        compute_cache_key(
            "/drugs/",
            &[("search", q.to_string()), ("limit", limit.to_string()), ("offset", offset.to_string())],
        )
    }

    #[test]
    fn test_key_stability() {
        assert_eq!(search_key("propofol", 10, 0), search_key("propofol", 10, 0));
    }

    #[test]
    fn test_key_differs_per_param() {
        let base = search_key("propofol", 10, 0);
        assert_ne!(base, search_key("propofol", 10, 10));
        assert_ne!(base, search_key("propofol", 20, 0));
        assert_ne!(base, search_key("ketamine", 10, 0));
    }

    #[test]
    fn test_key_differs_per_endpoint() {
        assert_ne!(compute_cache_key("/drugs/categories", &[]), compute_cache_key("/drugs/sitemap", &[]));
    }

    #[test]
    fn test_key_no_separator_collision() {
        let a = compute_cache_key("/drugs/", &[("search", "a\nlimit=1".to_string())]);
        let b = compute_cache_key("/drugs/", &[("search", "a".to_string()), ("limit", "1".to_string())]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_format() {
        let key = compute_cache_key("/drugs/categories", &[]);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
