mod error;
mod objects;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use objects::{is_safe_object_key, ObjectStore, ObjectStoreError, StoredObject};
pub use traits::{
    AnalyticsRepository, AttachmentRepository, EntryRepository, HealthCheck, UserRepository,
};
pub use types::DateRange;
