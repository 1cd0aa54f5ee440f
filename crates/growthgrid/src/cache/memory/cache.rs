//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with a fixed per-instance TTL and an
//! injected clock. Expiry is lazy: an expired value is evicted the first time
//! it is read.
//!
//! Keys are tracked per owning user so `invalidate_for_user` does not have to
//! scan the whole store. Each user also carries an invalidation generation;
//! ownerless invalidations and `clear` move a global epoch instead, which
//! covers every key.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use tokio::sync::RwLock;
use uuid::Uuid;

use growthgrid_core::cache::{Cache, CacheKey, Result};
use growthgrid_core::clock::Clock;

/// A single cache entry and the instant it stops being served.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The store and its per-user index, guarded together so every cache
/// operation sees a consistent view of both.
struct Inner {
    store: LruCache<CacheKey, CacheEntry>,
    /// Maps user_id -> keys owned by that user.
    tracking: HashMap<Uuid, HashSet<CacheKey>>,
    /// Maps user_id -> invalidations seen for that user. Never shrinks.
    generations: HashMap<Uuid, u64>,
    /// Invalidations that covered every user.
    epoch: u64,
}

impl Inner {
    /// Both counters only grow, so their sum changes on every invalidation
    /// that can reach `key`.
    fn generation_of(&self, key: &CacheKey) -> u64 {
        let owned = key
            .owner_id()
            .and_then(|owner| self.generations.get(&owner).copied())
            .unwrap_or(0);
        self.epoch.wrapping_add(owned)
    }

    fn bump(&mut self, owner: Option<Uuid>) {
        match owner {
            Some(owner) => {
                let generation = self.generations.entry(owner).or_default();
                *generation = generation.wrapping_add(1);
            }
            None => self.epoch = self.epoch.wrapping_add(1),
        }
    }

    fn remove(&mut self, key: &CacheKey) {
        self.store.pop(key);
        if let Some(owner) = key.owner_id() {
            if let Some(keys) = self.tracking.get_mut(&owner) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tracking.remove(&owner);
                }
            }
        }
    }

    fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        if let Some(owner) = key.owner_id() {
            self.tracking.entry(owner).or_default().insert(key.clone());
        }
        if let Some((evicted, _)) = self.store.push(key.clone(), entry) {
            if evicted != key {
                self.forget(&evicted);
            }
        }
    }

    /// Drops a key from the index only (the store already evicted it).
    fn forget(&mut self, key: &CacheKey) {
        if let Some(owner) = key.owner_id() {
            if let Some(keys) = self.tracking.get_mut(&owner) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tracking.remove(&owner);
                }
            }
        }
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<..>>` for concurrent access. The write
/// lock is taken even for reads because lazy expiry and LRU promotion both
/// mutate the store.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<RwLock<Inner>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl MemoryCache {
    /// Creates a new in-memory cache.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of entries before LRU eviction kicks in.
    ///   Zero is treated as one.
    /// * `ttl` - How long a value is served after it was set.
    /// * `clock` - Source of "now" for expiry checks.
    pub fn new(max_entries: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(RwLock::new(Inner {
                store: LruCache::new(capacity),
                tracking: HashMap::new(),
                generations: HashMap::new(),
                epoch: 0,
            })),
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Number of live or not-yet-evicted entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.store.len()
    }

    fn expiry(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn entry(&self, value: &[u8]) -> CacheEntry {
        CacheEntry {
            value: value.to_vec(),
            expires_at: self.expiry(),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;

        match inner.store.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        inner.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &[u8]) -> Result<()> {
        let entry = self.entry(value);
        let mut inner = self.inner.write().await;
        inner.insert(key.clone(), entry);
        Ok(())
    }

    async fn generation(&self, key: &CacheKey) -> Result<u64> {
        Ok(self.inner.read().await.generation_of(key))
    }

    async fn set_if_generation(
        &self,
        key: &CacheKey,
        value: &[u8],
        generation: u64,
    ) -> Result<bool> {
        let entry = self.entry(value);
        let mut inner = self.inner.write().await;
        if inner.generation_of(key) != generation {
            return Ok(false);
        }
        inner.insert(key.clone(), entry);
        Ok(true)
    }

    async fn delete(&self, key: &CacheKey) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.bump(key.owner_id());
        inner.remove(key);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &CacheKey) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.bump(prefix.owner_id());

        // Owner-scoped prefixes only need to look at that user's keys.
        let candidates: Vec<CacheKey> = match prefix.owner_id() {
            Some(owner) => inner
                .tracking
                .get(&owner)
                .map(|keys| keys.iter().cloned().collect())
                .unwrap_or_default(),
            None => inner.store.iter().map(|(key, _)| key.clone()).collect(),
        };

        for key in candidates.iter().filter(|key| key.starts_with(prefix)) {
            inner.remove(key);
        }
        Ok(())
    }

    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.bump(Some(user_id));
        let keys = inner.tracking.remove(&user_id).unwrap_or_default();
        for key in &keys {
            inner.store.pop(key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.bump(None);
        inner.store.clear();
        inner.tracking.clear();
        Ok(())
    }
}
