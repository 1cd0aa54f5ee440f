use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::analytics::{compute_streaks, HeatmapPoint, StreakResult};
use crate::journal::{Attachment, Entry, EntryPage, EntryQuery, User};

use super::{DateRange, Result};

/// Repository for journal entries, scoped by owner.
///
/// Lookups take the owning user so an entry belonging to someone else is
/// indistinguishable from a missing one.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Gets an entry by ID if it belongs to `user_id`.
    async fn get_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<Entry>>;

    /// Lists a user's entries, newest first, with filters and pagination.
    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> Result<EntryPage>;

    /// Returns every distinct tag name the user has used, sorted.
    async fn list_tags(&self, user_id: Uuid) -> Result<Vec<String>>;

    /// Creates an entry and returns it as stored.
    ///
    /// Tag names are resolved against the owner's existing tags, so the
    /// returned entry may carry different tag IDs than the input.
    async fn create_entry(&self, entry: &Entry) -> Result<Entry>;

    /// Replaces an existing entry's fields, tags and links.
    async fn update_entry(&self, entry: &Entry) -> Result<Entry>;

    /// Deletes an entry together with its links, tag associations and
    /// attachment records.
    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their (normalized) email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Updates an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Deletes a user and everything they own.
    async fn delete_user(&self, id: Uuid) -> Result<()>;
}

/// Repository for attachment records.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Stores a new attachment record.
    async fn create_attachment(&self, attachment: &Attachment) -> Result<()>;

    /// Gets an attachment if its entry belongs to `user_id`.
    async fn get_attachment(&self, user_id: Uuid, id: Uuid) -> Result<Option<Attachment>>;

    /// Deletes an attachment record.
    async fn delete_attachment(&self, id: Uuid) -> Result<()>;
}

/// Read-only aggregate queries feeding the analytics engine.
///
/// Every method is scoped strictly to one user.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Total number of entries the user has ever written.
    async fn count_entries(&self, user_id: Uuid) -> Result<u64>;

    /// Number of entries dated inside `range`. A vacuous range counts zero.
    async fn count_entries_in(&self, user_id: Uuid, range: DateRange) -> Result<u64>;

    /// The set of dates carrying at least one entry.
    async fn distinct_entry_dates(&self, user_id: Uuid) -> Result<BTreeSet<NaiveDate>>;

    /// The tag attached to the most entries, ties broken by name ascending.
    async fn most_used_tag(&self, user_id: Uuid) -> Result<Option<String>>;

    /// Per-date entry counts inside `range`, ascending by date, zero days omitted.
    async fn heatmap_counts(&self, user_id: Uuid, range: DateRange) -> Result<Vec<HeatmapPoint>>;

    /// Current and longest streak as of `today`.
    ///
    /// Backends that can compute runs natively may override this; the result
    /// must match [`compute_streaks`] over [`Self::distinct_entry_dates`].
    async fn streaks(&self, user_id: Uuid, today: NaiveDate) -> Result<StreakResult> {
        let dates = self.distinct_entry_dates(user_id).await?;
        Ok(compute_streaks(&dates, today))
    }
}

/// Liveness probe for a storage backend.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Runs a trivial round trip against the backend.
    async fn ping(&self) -> Result<()>;
}
