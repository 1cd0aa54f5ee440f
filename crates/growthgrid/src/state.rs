//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. It uses repository trait objects for storage abstraction
//! and supports different backends via feature flags.

use std::{sync::Arc, time::Instant};

use growthgrid_auth::{AuthConfig, AuthState};
use growthgrid_core::analytics::Analytics;
use growthgrid_core::cache::Cache;
use growthgrid_core::clock::{Clock, SystemClock};
use growthgrid_core::storage::{
    AnalyticsRepository, AttachmentRepository, EntryRepository, HealthCheck, ObjectStore,
    UserRepository,
};

use crate::analytics::AnalyticsService;
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::storage::{InvalidatingEntryRepository, LocalObjectStore};

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects for database access.
#[derive(Clone)]
pub struct AppState {
    /// Entry repository. Every write invalidates the owner's analytics.
    pub entries: Arc<dyn EntryRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
    /// Cache-aside analytics over the same store.
    pub analytics: Arc<dyn Analytics>,
    pub cache: Arc<dyn Cache>,
    /// Blob storage for uploaded files.
    pub objects: Arc<dyn ObjectStore>,
    /// Liveness probe for the database.
    pub database: Arc<dyn HealthCheck>,
    pub clock: Arc<dyn Clock>,
    pub auth: AuthState,
    /// Base URL prefixed to attachment file URLs.
    pub public_base_url: String,
    pub started_at: Instant,
}

impl AppState {
    /// Wires every service on top of a single storage backend.
    fn build<B>(
        backend: Arc<B>,
        objects: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        config: &Config,
        auth_config: AuthConfig,
    ) -> Self
    where
        B: EntryRepository
            + UserRepository
            + AttachmentRepository
            + AnalyticsRepository
            + HealthCheck
            + 'static,
    {
        let cache = Arc::new(MemoryCache::new(
            config.cache_max_entries,
            config.cache_ttl(),
            clock.clone(),
        ));

        let entries = Arc::new(InvalidatingEntryRepository::new(
            backend.clone(),
            cache.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(
            backend.clone(),
            cache.clone(),
            clock.clone(),
        ));
        let auth = AuthState::new(backend.clone(), cache.clone(), clock.clone(), auth_config);

        Self {
            entries,
            attachments: backend.clone(),
            analytics,
            cache,
            objects,
            database: backend,
            clock,
            auth,
            public_base_url: config.public_base_url.clone(),
            started_at: Instant::now(),
        }
    }

    /// Seconds since the state was built.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

fn system_clock(config: &Config) -> anyhow::Result<Arc<dyn Clock>> {
    let clock = SystemClock::with_offset_minutes(config.utc_offset_minutes).ok_or_else(|| {
        anyhow::anyhow!(
            "UTC_OFFSET_MINUTES must be within ±1440, got {}",
            config.utc_offset_minutes
        )
    })?;
    Ok(Arc::new(clock))
}

fn local_objects(config: &Config) -> Arc<dyn ObjectStore> {
    Arc::new(LocalObjectStore::new(&config.upload_dir))
}

// ============================================================================
// Factory functions for different backends
// ============================================================================

#[cfg(feature = "sqlite")]
mod sqlite_backend {
    use super::*;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and an in-memory cache.
        pub async fn new(config: &Config, auth_config: AuthConfig) -> anyhow::Result<Self> {
            let sqlite_repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            tracing::info!(path = %config.sqlite_path, "Opened SQLite database");

            Ok(Self::build(
                sqlite_repo,
                local_objects(config),
                system_clock(config)?,
                config,
                auth_config,
            ))
        }
    }
}

#[cfg(feature = "inmemory")]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and cache.
        /// Data is lost on restart.
        pub async fn new(config: &Config, auth_config: AuthConfig) -> anyhow::Result<Self> {
            tracing::warn!("Using in-memory storage; data will not survive a restart");

            Ok(Self::build(
                Arc::new(InMemoryRepository::new()),
                local_objects(config),
                system_clock(config)?,
                config,
                auth_config,
            ))
        }
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::storage::{InMemoryRepository, MemoryObjectStore};

    impl AppState {
        /// Creates an AppState with in-memory storage, objects and the given clock.
        pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
            let config = Config {
                cache_ttl_seconds: 60,
                cache_max_entries: 1000,
                public_base_url: "http://testserver".to_string(),
                ..Config::from_env()
            };

            Self::build(
                Arc::new(InMemoryRepository::new()),
                Arc::new(MemoryObjectStore::new()),
                clock,
                &config,
                AuthConfig::with_secret("test-secret"),
            )
        }
    }

    impl Default for AppState {
        /// Creates an AppState with in-memory storage for testing.
        fn default() -> Self {
            Self::with_clock(Arc::new(SystemClock::utc()))
        }
    }
}
