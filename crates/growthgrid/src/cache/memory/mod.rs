//! In-memory cache backend implementation.
//!
//! Provides a thread-safe in-memory cache with a fixed TTL and LRU eviction
//! for single-instance deployments.

mod cache;

pub use cache::MemoryCache;
