//! Repository decorators that keep the analytics cache honest.
//!
//! Every successful entry mutation drops the owner's cached aggregates before
//! the call returns, so the next read recomputes from the store.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let repo = Arc::new(InMemoryRepository::new());
//! let cache = Arc::new(MemoryCache::new(10_000, Duration::from_secs(60), clock));
//!
//! let entries = InvalidatingEntryRepository::new(repo, cache);
//! ```

mod entry;

pub use entry::InvalidatingEntryRepository;
