//! Functional core for GrowthGrid.
//!
//! Pure types, functions and the trait seams the server crate plugs its
//! backends into. Nothing in here performs I/O.

pub mod analytics;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod journal;
pub mod serde;
pub mod storage;
