//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the repository traits
//! that keeps every table in a single `Arc<RwLock<_>>`. It is the default
//! backend for development and the backend used by the router tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use growthgrid::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
