//! SQLite repository implementation.
//!
//! Implements the repository traits from `growthgrid_core::storage` using SQLite.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use growthgrid_core::analytics::{HeatmapPoint, StreakResult};
use growthgrid_core::journal::{Attachment, Entry, EntryPage, EntryQuery, Tag, User};
use growthgrid_core::storage::{
    AnalyticsRepository, AttachmentRepository, DateRange, EntryRepository, HealthCheck,
    RepositoryError, Result, UserRepository,
};

use super::conversions::{
    format_date, format_datetime, row_to_attachment, row_to_count, row_to_date, row_to_entry,
    row_to_heatmap_point, row_to_link, row_to_streaks, row_to_tag, row_to_user,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Fails with `QueryReturnedNoRows` when a write touched nothing.
fn expect_rows(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// Attaches tags, links and attachment records to a bare entry row.
fn load_children(conn: &rusqlite::Connection, entry: &mut Entry) -> rusqlite::Result<()> {
    let id = entry.id.to_string();

    let mut stmt = conn.prepare_cached(schema::SELECT_TAGS_FOR_ENTRY)?;
    entry.tags = stmt
        .query_map([&id], row_to_tag)?
        .collect::<rusqlite::Result<_>>()?;

    let mut stmt = conn.prepare_cached(schema::SELECT_LINKS_FOR_ENTRY)?;
    entry.links = stmt
        .query_map([&id], row_to_link)?
        .collect::<rusqlite::Result<_>>()?;

    let mut stmt = conn.prepare_cached(schema::SELECT_ATTACHMENTS_FOR_ENTRY)?;
    entry.attachments = stmt
        .query_map([&id], row_to_attachment)?
        .collect::<rusqlite::Result<_>>()?;

    Ok(())
}

/// Loads a full entry if it exists and belongs to `user_id`.
fn select_entry(
    conn: &rusqlite::Connection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Entry>> {
    let mut stmt = conn.prepare_cached(schema::SELECT_ENTRY_BY_ID)?;
    let mut entry = match stmt.query_row([id, user_id], row_to_entry) {
        Ok(entry) => entry,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e),
    };
    load_children(conn, &mut entry)?;
    Ok(Some(entry))
}

/// Writes the tag associations and links of `entry`, resolving each tag name
/// against the owner's existing tags.
///
/// Returns the tags with the IDs they were stored under.
fn write_children(conn: &rusqlite::Connection, entry: &Entry) -> rusqlite::Result<Vec<Tag>> {
    let entry_id = entry.id.to_string();
    let user_id = entry.user_id.to_string();

    let mut resolved = Vec::with_capacity(entry.tags.len());
    for (position, tag) in entry.tags.iter().enumerate() {
        conn.execute(
            schema::UPSERT_TAG,
            rusqlite::params![tag.id.to_string(), user_id, tag.name],
        )?;
        let tag_id: String =
            conn.query_row(schema::SELECT_TAG_ID, [&user_id, &tag.name], |row| {
                row.get(0)
            })?;
        conn.execute(
            schema::INSERT_ENTRY_TAG,
            rusqlite::params![entry_id, tag_id, position as i64],
        )?;
        resolved.push(Tag {
            id: Uuid::parse_str(&tag_id).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            name: tag.name.clone(),
        });
    }

    for (position, link) in entry.links.iter().enumerate() {
        conn.execute(
            schema::INSERT_LINK,
            rusqlite::params![
                link.id.to_string(),
                entry_id,
                position as i64,
                link.title,
                link.url
            ],
        )?;
    }

    Ok(resolved)
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for all entity types.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// EntryRepository implementation
// ============================================================================

#[async_trait]
impl EntryRepository for SqliteRepository {
    async fn get_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<Entry>> {
        let user_id = user_id.to_string();
        let id_str = id.to_string();

        self.conn
            .call(move |conn| select_entry(conn, &user_id, &id_str).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Entry", id.to_string()))
    }

    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> Result<EntryPage> {
        let user_id = user_id.to_string();
        let date = query.date.as_ref().map(format_date);
        let tag = query.normalized_tag();
        let limit = i64::from(query.limit);
        let offset = i64::from(query.offset);

        self.conn
            .call(move |conn| {
                let total = conn
                    .query_row(
                        &schema::count_entries_matching(),
                        rusqlite::params![user_id, date, tag],
                        row_to_count,
                    )
                    .map_err(wrap_err)?;

                let mut stmt = conn
                    .prepare(&schema::select_entries_page())
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![user_id, date, tag, limit, offset],
                        row_to_entry,
                    )
                    .map_err(wrap_err)?;

                let mut entries = Vec::new();
                for row_result in rows {
                    let mut entry = row_result.map_err(wrap_err)?;
                    load_children(conn, &mut entry).map_err(wrap_err)?;
                    entries.push(entry);
                }
                Ok(EntryPage { entries, total })
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }

    async fn list_tags(&self, user_id: Uuid) -> Result<Vec<String>> {
        let user_id = user_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TAG_NAMES_FOR_USER)
                    .map_err(wrap_err)?;
                let names = stmt
                    .query_map([&user_id], |row| row.get(0))
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<String>>>()
                    .map_err(wrap_err)?;
                Ok(names)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Tag"))
    }

    async fn create_entry(&self, entry: &Entry) -> Result<Entry> {
        let entry = entry.clone();
        let entry_id = entry.id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                tx.execute(
                    schema::INSERT_ENTRY,
                    rusqlite::params![
                        entry.id.to_string(),
                        entry.user_id.to_string(),
                        format_date(&entry.date),
                        entry.title,
                        entry.content,
                        format_datetime(&entry.created_at),
                        format_datetime(&entry.updated_at)
                    ],
                )
                .map_err(wrap_err)?;
                let tags = write_children(&tx, &entry).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                let mut stored = entry;
                stored.tags = tags;
                stored.attachments.clear();
                Ok(stored)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Entry", entry_id))
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry> {
        let entry = entry.clone();
        let entry_id = entry.id.to_string();

        self.conn
            .call(move |conn| {
                let id = entry.id.to_string();
                let user_id = entry.user_id.to_string();

                let tx = conn.transaction().map_err(wrap_err)?;
                let rows = tx
                    .execute(
                        schema::UPDATE_ENTRY,
                        rusqlite::params![
                            id,
                            user_id,
                            format_date(&entry.date),
                            entry.title,
                            entry.content,
                            format_datetime(&entry.updated_at)
                        ],
                    )
                    .map_err(wrap_err)?;
                expect_rows(rows)?;

                tx.execute(schema::DELETE_ENTRY_TAGS, [&id])
                    .map_err(wrap_err)?;
                tx.execute(schema::DELETE_LINKS, [&id]).map_err(wrap_err)?;
                write_children(&tx, &entry).map_err(wrap_err)?;

                let stored = select_entry(&tx, &user_id, &id).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                stored.ok_or_else(|| wrap_err(rusqlite::Error::QueryReturnedNoRows))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Entry", entry_id))
    }

    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let user_id = user_id.to_string();
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_ENTRY, [&id_str, &user_id])
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Entry", id.to_string()))
    }
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_USER_BY_EMAIL)
                    .map_err(wrap_err)?;
                match stmt.query_row([&email], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "User"))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let email = user.email.clone();
        let password_hash = user.password_hash.clone();
        let created_at = format_datetime(&user.created_at);
        let conflict_id = user.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![id, email, password_hash, created_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", conflict_id))
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let id = user.id.to_string();
        let email = user.email.clone();
        let password_hash = user.password_hash.clone();
        let user_id = user.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_USER,
                        rusqlite::params![id, email, password_hash],
                    )
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user_id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_USER, [&id_str])
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_string()))
    }
}

// ============================================================================
// AttachmentRepository implementation
// ============================================================================

#[async_trait]
impl AttachmentRepository for SqliteRepository {
    async fn create_attachment(&self, attachment: &Attachment) -> Result<()> {
        let a = attachment.clone();
        let attachment_id = attachment.id.to_string();
        let size_bytes = i64::try_from(a.size_bytes)
            .map_err(|e| RepositoryError::InvalidData(format!("size_bytes: {e}")))?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ATTACHMENT,
                    rusqlite::params![
                        a.id.to_string(),
                        a.entry_id.to_string(),
                        a.file_name,
                        a.file_url,
                        a.content_type,
                        size_bytes,
                        a.object_key,
                        format_datetime(&a.uploaded_at)
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Attachment", attachment_id))
    }

    async fn get_attachment(&self, user_id: Uuid, id: Uuid) -> Result<Option<Attachment>> {
        let user_id = user_id.to_string();
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ATTACHMENT_FOR_OWNER)
                    .map_err(wrap_err)?;
                match stmt.query_row([&id_str, &user_id], row_to_attachment) {
                    Ok(attachment) => Ok(Some(attachment)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Attachment", id.to_string()))
    }

    async fn delete_attachment(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_ATTACHMENT, [&id_str])
                    .map_err(wrap_err)?;
                expect_rows(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Attachment", id.to_string()))
    }
}

// ============================================================================
// AnalyticsRepository implementation
// ============================================================================

#[async_trait]
impl AnalyticsRepository for SqliteRepository {
    async fn count_entries(&self, user_id: Uuid) -> Result<u64> {
        let user_id = user_id.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::COUNT_ENTRIES, [&user_id], row_to_count)
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }

    async fn count_entries_in(&self, user_id: Uuid, range: DateRange) -> Result<u64> {
        if range.is_vacuous() {
            return Ok(0);
        }

        let user_id = user_id.to_string();
        let start = range.start.as_ref().map(format_date);
        let end = range.end.as_ref().map(format_date);

        self.conn
            .call(move |conn| {
                conn.query_row(
                    schema::COUNT_ENTRIES_IN_RANGE,
                    rusqlite::params![user_id, start, end],
                    row_to_count,
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }

    async fn distinct_entry_dates(&self, user_id: Uuid) -> Result<BTreeSet<NaiveDate>> {
        let user_id = user_id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_DISTINCT_DATES)
                    .map_err(wrap_err)?;
                let dates = stmt
                    .query_map([&user_id], row_to_date)
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<BTreeSet<NaiveDate>>>()
                    .map_err(wrap_err)?;
                Ok(dates)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }

    async fn most_used_tag(&self, user_id: Uuid) -> Result<Option<String>> {
        let user_id = user_id.to_string();

        self.conn
            .call(move |conn| {
                match conn.query_row(schema::SELECT_MOST_USED_TAG, [&user_id], |row| row.get(0)) {
                    Ok(name) => Ok(Some(name)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Tag"))
    }

    async fn heatmap_counts(&self, user_id: Uuid, range: DateRange) -> Result<Vec<HeatmapPoint>> {
        if range.is_vacuous() {
            return Ok(Vec::new());
        }

        let user_id = user_id.to_string();
        let start = range.start.as_ref().map(format_date);
        let end = range.end.as_ref().map(format_date);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_HEATMAP).map_err(wrap_err)?;
                let points = stmt
                    .query_map(rusqlite::params![user_id, start, end], row_to_heatmap_point)
                    .map_err(wrap_err)?
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)?;
                Ok(points)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }

    async fn streaks(&self, user_id: Uuid, today: NaiveDate) -> Result<StreakResult> {
        let user_id = user_id.to_string();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let today = format_date(&today);
        let yesterday = format_date(&yesterday);

        self.conn
            .call(move |conn| {
                conn.query_row(
                    schema::SELECT_STREAKS,
                    [&user_id, &today, &yesterday],
                    row_to_streaks,
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Entry"))
    }
}

#[async_trait]
impl HealthCheck for SqliteRepository {
    async fn ping(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.query_row(schema::PING, [], |row| row.get::<_, i64>(0))
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))
    }
}
