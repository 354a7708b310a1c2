//! In-process cache for API responses.
//!
//! This module provides a process-lifetime cache keyed by request parameters.
//! It supports:
//!
//! - Deterministic keys using SHA-256 hashing of endpoint and parameters
//! - A uniform TTL applied to every entry
//! - A capacity bound with least-recently-used eviction

pub mod key;
pub mod memory;

pub use key::compute_cache_key;
pub use memory::{CacheStats, DEFAULT_CAPACITY, DEFAULT_TTL, TtlCache};
