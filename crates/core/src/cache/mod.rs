mod error;
mod keys;
pub mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{heatmap_key, heatmap_prefix, summary_key, summary_prefix, CacheKey};
pub use traits::Cache;
