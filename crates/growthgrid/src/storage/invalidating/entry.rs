//! Invalidating entry repository decorator.
//!
//! Wraps an `EntryRepository` so that creates, updates and deletes clear the
//! owner's cached analytics.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use growthgrid_core::cache::Cache;
use growthgrid_core::journal::{Entry, EntryPage, EntryQuery};
use growthgrid_core::storage::{EntryRepository, Result};

/// Entry repository decorator that invalidates cached aggregates.
///
/// - **Reads**: Pass straight through to the repository
/// - **Writes**: Persist to repository, then invalidate every cache key owned
///   by the entry's user
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct InvalidatingEntryRepository<R, C>
where
    R: EntryRepository + ?Sized,
    C: Cache + ?Sized,
{
    repository: Arc<R>,
    cache: Arc<C>,
}

impl<R, C> InvalidatingEntryRepository<R, C>
where
    R: EntryRepository + ?Sized,
    C: Cache + ?Sized,
{
    /// Creates a new invalidating entry repository.
    pub fn new(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self { repository, cache }
    }

    async fn invalidate(&self, user_id: Uuid) {
        if let Err(err) = self.cache.invalidate_for_user(user_id).await {
            tracing::warn!(%user_id, error = %err, "Failed to invalidate analytics cache");
        }
    }
}

#[async_trait]
impl<R, C> EntryRepository for InvalidatingEntryRepository<R, C>
where
    R: EntryRepository + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn get_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<Entry>> {
        self.repository.get_entry(user_id, id).await
    }

    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> Result<EntryPage> {
        self.repository.list_entries(user_id, query).await
    }

    async fn list_tags(&self, user_id: Uuid) -> Result<Vec<String>> {
        self.repository.list_tags(user_id).await
    }

    async fn create_entry(&self, entry: &Entry) -> Result<Entry> {
        let created = self.repository.create_entry(entry).await?;
        self.invalidate(created.user_id).await;

        tracing::info!(entry_id = %created.id, user_id = %created.user_id, "Entry created");
        Ok(created)
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry> {
        let updated = self.repository.update_entry(entry).await?;
        self.invalidate(updated.user_id).await;

        tracing::info!(entry_id = %updated.id, user_id = %updated.user_id, "Entry updated");
        Ok(updated)
    }

    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.repository.delete_entry(user_id, id).await?;
        self.invalidate(user_id).await;

        tracing::info!(entry_id = %id, %user_id, "Entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::NaiveDate;
    use tokio::sync::RwLock;

    use growthgrid_core::cache::{heatmap_key, summary_key, CacheKey};
    use growthgrid_core::clock::ManualClock;
    use growthgrid_core::journal::paginate_entries;
    use growthgrid_core::storage::{DateRange, RepositoryError};

    use crate::cache::MemoryCache;

    // Mock repository that tracks calls
    struct MockEntryRepository {
        entries: RwLock<HashMap<Uuid, Entry>>,
        write_calls: AtomicUsize,
    }

    impl MockEntryRepository {
        fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
                write_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EntryRepository for MockEntryRepository {
        async fn get_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<Entry>> {
            Ok(self
                .entries
                .read()
                .await
                .get(&id)
                .filter(|e| e.user_id == user_id)
                .cloned())
        }

        async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> Result<EntryPage> {
            let entries = self
                .entries
                .read()
                .await
                .values()
                .filter(|e| e.user_id == user_id && query.matches(e))
                .cloned()
                .collect();
            Ok(paginate_entries(entries, query))
        }

        async fn list_tags(&self, _user_id: Uuid) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn create_entry(&self, entry: &Entry) -> Result<Entry> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.entries.write().await.insert(entry.id, entry.clone());
            Ok(entry.clone())
        }

        async fn update_entry(&self, entry: &Entry) -> Result<Entry> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            let mut entries = self.entries.write().await;
            match entries.get_mut(&entry.id) {
                Some(existing) => {
                    *existing = entry.clone();
                    Ok(entry.clone())
                }
                None => Err(RepositoryError::NotFound {
                    entity_type: "Entry",
                    id: entry.id.to_string(),
                }),
            }
        }

        async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<()> {
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            let mut entries = self.entries.write().await;
            match entries.get(&id) {
                Some(e) if e.user_id == user_id => {
                    entries.remove(&id);
                    Ok(())
                }
                _ => Err(RepositoryError::NotFound {
                    entity_type: "Entry",
                    id: id.to_string(),
                }),
            }
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn setup() -> (
        Arc<MockEntryRepository>,
        Arc<MemoryCache>,
        InvalidatingEntryRepository<MockEntryRepository, MemoryCache>,
    ) {
        let repo = Arc::new(MockEntryRepository::new());
        let clock = Arc::new(ManualClock::at_date(date()));
        let cache = Arc::new(MemoryCache::new(100, Duration::from_secs(3600), clock));
        let decorated = InvalidatingEntryRepository::new(repo.clone(), cache.clone());
        (repo, cache, decorated)
    }

    async fn warm(cache: &MemoryCache, user_id: Uuid) -> Vec<CacheKey> {
        let keys = vec![
            summary_key(user_id, date()),
            heatmap_key(user_id, &DateRange::all()),
        ];
        for key in &keys {
            cache.set(key, b"cached").await.unwrap();
        }
        keys
    }

    async fn all_gone(cache: &MemoryCache, keys: &[CacheKey]) -> bool {
        for key in keys {
            if cache.get(key).await.unwrap().is_some() {
                return false;
            }
        }
        true
    }

    #[tokio::test]
    async fn test_create_invalidates_owner() {
        let (_repo, cache, decorated) = setup();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let keys = warm(&cache, user).await;
        let other_keys = warm(&cache, other).await;

        decorated
            .create_entry(&Entry::new(user, date(), "note"))
            .await
            .unwrap();

        assert!(all_gone(&cache, &keys).await);
        assert!(cache.get(&other_keys[0]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_invalidates_owner() {
        let (_repo, cache, decorated) = setup();
        let user = Uuid::new_v4();
        let mut entry = decorated
            .create_entry(&Entry::new(user, date(), "note"))
            .await
            .unwrap();
        let keys = warm(&cache, user).await;

        entry.content = "edited".to_string();
        decorated.update_entry(&entry).await.unwrap();

        assert!(all_gone(&cache, &keys).await);
    }

    #[tokio::test]
    async fn test_delete_invalidates_owner() {
        let (_repo, cache, decorated) = setup();
        let user = Uuid::new_v4();
        let entry = decorated
            .create_entry(&Entry::new(user, date(), "note"))
            .await
            .unwrap();
        let keys = warm(&cache, user).await;

        decorated.delete_entry(user, entry.id).await.unwrap();

        assert!(all_gone(&cache, &keys).await);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let (repo, cache, decorated) = setup();
        let user = Uuid::new_v4();
        let keys = warm(&cache, user).await;

        let result = decorated.delete_entry(user, Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(repo.write_calls.load(Ordering::SeqCst), 1);
        assert!(cache.get(&keys[0]).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reads_do_not_invalidate() {
        let (_repo, cache, decorated) = setup();
        let user = Uuid::new_v4();
        let entry = decorated
            .create_entry(&Entry::new(user, date(), "note"))
            .await
            .unwrap();
        let keys = warm(&cache, user).await;

        decorated.get_entry(user, entry.id).await.unwrap();
        decorated
            .list_entries(user, &EntryQuery::default())
            .await
            .unwrap();

        assert!(cache.get(&keys[0]).await.unwrap().is_some());
    }
}
