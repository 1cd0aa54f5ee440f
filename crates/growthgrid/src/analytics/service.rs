//! Cached analytics service.
//!
//! Computes heatmaps and summaries from an `AnalyticsRepository` and keeps the
//! results in a `Cache` using the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss query the repository and populate cache
//! - **Invalidation**: Done by the entry store decorator, never here
//!
//! The cache generation is read before the repository is queried, and the
//! result is only stored if no invalidation happened in between.
//!
//! A failing cache is never fatal. Errors are logged and the request falls
//! through to the repository.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use growthgrid_core::analytics::{Analytics, HeatmapPoint, Result, SummaryReport};
use growthgrid_core::cache::serialization::{
    deserialize_heatmap, deserialize_summary, serialize_heatmap, serialize_summary,
    SerializationError,
};
use growthgrid_core::cache::{heatmap_key, summary_key, Cache, CacheError, CacheKey};
use growthgrid_core::clock::Clock;
use growthgrid_core::storage::{AnalyticsRepository, DateRange};

/// Aggregation engine with a result cache in front of it.
///
/// # Type Parameters
///
/// * `R` - The repository answering aggregate queries
/// * `C` - The cache implementation
pub struct AnalyticsService<R, C>
where
    R: AnalyticsRepository + ?Sized,
    C: Cache + ?Sized,
{
    repository: Arc<R>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<R, C> AnalyticsService<R, C>
where
    R: AnalyticsRepository + ?Sized,
    C: Cache + ?Sized,
{
    /// Creates a new analytics service.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store to aggregate over
    /// * `cache` - The result cache (its TTL is fixed by the cache itself)
    /// * `clock` - Source of "today" for streak anchoring and summary keys
    pub fn new(repository: Arc<R>, cache: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            cache,
            clock,
        }
    }

    async fn lookup<T>(
        &self,
        key: &CacheKey,
        decode: fn(&[u8]) -> std::result::Result<T, SerializationError>,
    ) -> std::result::Result<Option<T>, CacheError> {
        let Some(bytes) = self.cache.get(key).await? else {
            return Ok(None);
        };
        Ok(Some(decode(&bytes)?))
    }

    async fn cached<T>(
        &self,
        key: &CacheKey,
        decode: fn(&[u8]) -> std::result::Result<T, SerializationError>,
    ) -> Option<T> {
        match self.lookup(key, decode).await {
            Ok(Some(value)) => {
                tracing::trace!(%key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                tracing::trace!(%key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "Cache read failed, falling through to store");
                None
            }
        }
    }

    /// Reads the generation a computed value must still match to be stored.
    async fn generation(&self, key: &CacheKey) -> Option<u64> {
        match self.cache.generation(key).await {
            Ok(generation) => Some(generation),
            Err(err) => {
                tracing::warn!(%key, error = %err, "Cache generation unavailable, result won't be cached");
                None
            }
        }
    }

    async fn populate(
        &self,
        key: &CacheKey,
        generation: Option<u64>,
        encoded: std::result::Result<Vec<u8>, SerializationError>,
    ) {
        let Some(generation) = generation else {
            return;
        };
        let stored = match encoded {
            Ok(bytes) => self.cache.set_if_generation(key, &bytes, generation).await,
            Err(err) => Err(err.into()),
        };
        match stored {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(%key, "Invalidated while computing, result not cached");
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "Failed to cache aggregate");
            }
        }
    }

    async fn compute_summary(
        &self,
        user_id: Uuid,
        today: chrono::NaiveDate,
    ) -> Result<SummaryReport> {
        let total_entries = self.repository.count_entries(user_id).await?;
        if total_entries == 0 {
            return Ok(SummaryReport::empty());
        }

        let streaks = self.repository.streaks(user_id, today).await?;
        let most_used_tag = self.repository.most_used_tag(user_id).await?;
        let entries_this_month = self
            .repository
            .count_entries_in(user_id, DateRange::month_to_date(today))
            .await?;

        debug_assert!(streaks.longest_streak >= streaks.current_streak);

        Ok(SummaryReport::assemble(
            total_entries,
            streaks,
            most_used_tag,
            entries_this_month,
        ))
    }
}

#[async_trait]
impl<R, C> Analytics for AnalyticsService<R, C>
where
    R: AnalyticsRepository + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn get_heatmap(&self, user_id: Uuid, range: DateRange) -> Result<Vec<HeatmapPoint>> {
        if range.is_vacuous() {
            return Ok(Vec::new());
        }

        let key = heatmap_key(user_id, &range);
        if let Some(points) = self.cached(&key, deserialize_heatmap).await {
            return Ok(points);
        }

        let generation = self.generation(&key).await;
        let points = self.repository.heatmap_counts(user_id, range).await?;
        self.populate(&key, generation, serialize_heatmap(&points)).await;

        Ok(points)
    }

    async fn get_summary(&self, user_id: Uuid) -> Result<SummaryReport> {
        let today = self.clock.today();
        let key = summary_key(user_id, today);
        if let Some(summary) = self.cached(&key, deserialize_summary).await {
            return Ok(summary);
        }

        let generation = self.generation(&key).await;
        let summary = self.compute_summary(user_id, today).await?;
        self.populate(&key, generation, serialize_summary(&summary)).await;

        Ok(summary)
    }
}
