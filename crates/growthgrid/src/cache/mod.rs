//! Cache backend implementations.
//!
//! This module provides the concrete implementation of the cache trait
//! defined in `growthgrid_core::cache`. The cache is process-local: there is
//! no cross-instance coherence.

pub mod memory;

pub use memory::MemoryCache;
