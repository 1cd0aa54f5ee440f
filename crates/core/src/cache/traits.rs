use async_trait::async_trait;
use uuid::Uuid;

use super::{CacheKey, Result};

/// A keyed byte cache with a fixed time-to-live.
///
/// Implementations must make every operation atomic with respect to the
/// others, and must never return a value after its TTL has elapsed or after
/// an invalidation covering its key.
///
/// Every invalidation moves a *generation* forward. A reader that computes a
/// value from the backing store reads the generation first and stores with
/// [`Cache::set_if_generation`], so a value computed before an invalidation
/// can never land after it.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a live value, evicting it first if it has expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Stores a value, replacing any previous one and restarting its TTL.
    async fn set(&self, key: &CacheKey, value: &[u8]) -> Result<()>;

    /// The current generation of the invalidations that can cover `key`.
    async fn generation(&self, key: &CacheKey) -> Result<u64>;

    /// Stores a value like [`Cache::set`], unless an invalidation covering
    /// `key` happened since `generation` was read. Returns whether it stored.
    async fn set_if_generation(
        &self,
        key: &CacheKey,
        value: &[u8],
        generation: u64,
    ) -> Result<bool>;

    /// Removes a single key.
    async fn delete(&self, key: &CacheKey) -> Result<()>;

    /// Removes every key whose leading segments equal `prefix`.
    async fn invalidate_prefix(&self, prefix: &CacheKey) -> Result<()>;

    /// Removes every key owned by `user_id`, whatever its kind.
    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<()>;

    /// Removes everything.
    async fn clear(&self) -> Result<()>;
}
