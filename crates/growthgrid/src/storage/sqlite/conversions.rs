//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use growthgrid_core::analytics::{HeatmapPoint, StreakResult};
use growthgrid_core::journal::{Attachment, Entry, Link, Tag, User};

// ============================================================================
// User conversions
// ============================================================================

/// Convert a SQLite row to a User.
///
/// Expected columns: id, email, password_hash, created_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let email: String = row.get(1)?;
    let password_hash: String = row.get(2)?;
    let created_at: String = row.get(3)?;

    Ok(User {
        id: parse_uuid(&id)?,
        email,
        password_hash,
        created_at: parse_datetime(&created_at)?,
    })
}

// ============================================================================
// Entry conversions
// ============================================================================

/// Convert a SQLite row to an Entry without its tags, links or attachments.
///
/// Expected columns: id, user_id, date, title, content, created_at, updated_at
pub fn row_to_entry(row: &Row) -> rusqlite::Result<Entry> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let date: String = row.get(2)?;
    let title: Option<String> = row.get(3)?;
    let content: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Entry {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        date: parse_date(&date)?,
        title,
        content,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        tags: Vec::new(),
        links: Vec::new(),
        attachments: Vec::new(),
    })
}

/// Convert a SQLite row to a Tag.
///
/// Expected columns: id, name
pub fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    let id: String = row.get(0)?;
    Ok(Tag {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
    })
}

/// Convert a SQLite row to a Link.
///
/// Expected columns: id, title, url
pub fn row_to_link(row: &Row) -> rusqlite::Result<Link> {
    let id: String = row.get(0)?;
    Ok(Link {
        id: parse_uuid(&id)?,
        title: row.get(1)?,
        url: row.get(2)?,
    })
}

// ============================================================================
// Attachment conversions
// ============================================================================

/// Convert a SQLite row to an Attachment.
///
/// Expected columns: id, entry_id, file_name, file_url, content_type,
/// size_bytes, object_key, uploaded_at
pub fn row_to_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    let id: String = row.get(0)?;
    let entry_id: String = row.get(1)?;
    let size_bytes: i64 = row.get(5)?;
    let uploaded_at: String = row.get(7)?;

    Ok(Attachment {
        id: parse_uuid(&id)?,
        entry_id: parse_uuid(&entry_id)?,
        file_name: row.get(2)?,
        file_url: row.get(3)?,
        content_type: row.get(4)?,
        size_bytes: to_unsigned(size_bytes, 5)?,
        object_key: row.get(6)?,
        uploaded_at: parse_datetime(&uploaded_at)?,
    })
}

// ============================================================================
// Analytics conversions
// ============================================================================

/// Convert a SQLite row to a HeatmapPoint.
///
/// Expected columns: date, count
pub fn row_to_heatmap_point(row: &Row) -> rusqlite::Result<HeatmapPoint> {
    let date: String = row.get(0)?;
    let count: i64 = row.get(1)?;
    Ok(HeatmapPoint::new(parse_date(&date)?, to_unsigned(count, 1)?))
}

/// Convert a SQLite row to a StreakResult.
///
/// Expected columns: current_streak, longest_streak
pub fn row_to_streaks(row: &Row) -> rusqlite::Result<StreakResult> {
    let current: i64 = row.get(0)?;
    let longest: i64 = row.get(1)?;
    Ok(StreakResult {
        current_streak: to_u32(current, 0)?,
        longest_streak: to_u32(longest, 1)?,
    })
}

/// Reads a single COUNT(*) column.
pub fn row_to_count(row: &Row) -> rusqlite::Result<u64> {
    let count: i64 = row.get(0)?;
    to_unsigned(count, 0)
}

/// Reads a single date column.
pub fn row_to_date(row: &Row) -> rusqlite::Result<NaiveDate> {
    let date: String = row.get(0)?;
    parse_date(&date)
}

// ============================================================================
// Helpers
// ============================================================================

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_error(0, e))
}

/// Parse a date from ISO 8601 string (YYYY-MM-DD).
fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| conversion_error(0, e))
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(0, e))
}

fn to_unsigned(value: i64, column: usize) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Integer,
            Box::new(e),
        )
    })
}

fn to_u32(value: i64, column: usize) -> rusqlite::Result<u32> {
    u32::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Integer,
            Box::new(e),
        )
    })
}

/// Format a DateTime for SQLite storage.
///
/// Fixed-width nanoseconds with a `Z` suffix, so text order is time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Format a NaiveDate for SQLite storage (YYYY-MM-DD).
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
