//! Core types and shared functionality for drugbit.
//!
//! This crate provides:
//! - The canonical `Drug` record
//! - In-memory TTL cache with LRU eviction
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod drug;
pub mod error;

pub use cache::{CacheStats, TtlCache, compute_cache_key};
pub use config::{AppConfig, ConfigError};
pub use drug::{Drug, DrugRef, MAX_LIMIT};
pub use error::Error;
