//! Object store backends for uploaded attachments.
//!
//! - `LocalObjectStore`: files under a root directory, served back through
//!   `GET /files/{*key}`
//! - `MemoryObjectStore`: a HashMap, for tests

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
