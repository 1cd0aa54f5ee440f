//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
///
/// Foreign keys are enabled per connection, so the pragma lives here too.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Journal entries table
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    title TEXT,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Tags are owned by a user and shared across that user's entries
CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    UNIQUE (user_id, name),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS entry_tags (
    entry_id TEXT NOT NULL,
    tag_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (entry_id, tag_id),
    FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS links (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    title TEXT,
    url TEXT NOT NULL,
    FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS attachments (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_url TEXT NOT NULL,
    content_type TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    object_key TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, date);
CREATE INDEX IF NOT EXISTS idx_entry_tags_tag_id ON entry_tags(tag_id);
CREATE INDEX IF NOT EXISTS idx_links_entry_id ON links(entry_id);
CREATE INDEX IF NOT EXISTS idx_attachments_entry_id ON attachments(entry_id);
"#;

pub const PING: &str = "SELECT 1";

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, email, password_hash, created_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, password_hash, created_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, password_hash, created_at
FROM users
WHERE email = ?1
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET email = ?2, password_hash = ?3
WHERE id = ?1
"#;

pub const DELETE_USER: &str = r#"
DELETE FROM users
WHERE id = ?1
"#;

// Entry queries
pub const INSERT_ENTRY: &str = r#"
INSERT INTO entries (id, user_id, date, title, content, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_ENTRY_BY_ID: &str = r#"
SELECT id, user_id, date, title, content, created_at, updated_at
FROM entries
WHERE id = ?1 AND user_id = ?2
"#;

/// Shared filter for listing: ?1 user, ?2 optional date, ?3 optional tag name.
const ENTRY_FILTER: &str = r#"
WHERE e.user_id = ?1
  AND (?2 IS NULL OR e.date = ?2)
  AND (?3 IS NULL OR EXISTS (
      SELECT 1 FROM entry_tags et
      INNER JOIN tags t ON t.id = et.tag_id
      WHERE et.entry_id = e.id AND t.name = ?3
  ))
"#;

pub fn select_entries_page() -> String {
    format!(
        "SELECT e.id, e.user_id, e.date, e.title, e.content, e.created_at, e.updated_at \
         FROM entries e {ENTRY_FILTER} \
         ORDER BY e.date DESC, e.created_at DESC \
         LIMIT ?4 OFFSET ?5"
    )
}

pub fn count_entries_matching() -> String {
    format!("SELECT COUNT(*) FROM entries e {ENTRY_FILTER}")
}

pub const UPDATE_ENTRY: &str = r#"
UPDATE entries
SET date = ?3, title = ?4, content = ?5, updated_at = ?6
WHERE id = ?1 AND user_id = ?2
"#;

pub const DELETE_ENTRY: &str = r#"
DELETE FROM entries
WHERE id = ?1 AND user_id = ?2
"#;

// Tag queries
pub const UPSERT_TAG: &str = r#"
INSERT INTO tags (id, user_id, name)
VALUES (?1, ?2, ?3)
ON CONFLICT (user_id, name) DO NOTHING
"#;

pub const SELECT_TAG_ID: &str = r#"
SELECT id FROM tags
WHERE user_id = ?1 AND name = ?2
"#;

pub const INSERT_ENTRY_TAG: &str = r#"
INSERT INTO entry_tags (entry_id, tag_id, position)
VALUES (?1, ?2, ?3)
"#;

pub const DELETE_ENTRY_TAGS: &str = r#"
DELETE FROM entry_tags
WHERE entry_id = ?1
"#;

pub const SELECT_TAGS_FOR_ENTRY: &str = r#"
SELECT t.id, t.name
FROM tags t
INNER JOIN entry_tags et ON et.tag_id = t.id
WHERE et.entry_id = ?1
ORDER BY et.position ASC
"#;

pub const SELECT_TAG_NAMES_FOR_USER: &str = r#"
SELECT DISTINCT t.name
FROM tags t
INNER JOIN entry_tags et ON et.tag_id = t.id
WHERE t.user_id = ?1
ORDER BY t.name ASC
"#;

// Link queries
pub const INSERT_LINK: &str = r#"
INSERT INTO links (id, entry_id, position, title, url)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const DELETE_LINKS: &str = r#"
DELETE FROM links
WHERE entry_id = ?1
"#;

pub const SELECT_LINKS_FOR_ENTRY: &str = r#"
SELECT id, title, url
FROM links
WHERE entry_id = ?1
ORDER BY position ASC
"#;

// Attachment queries
pub const INSERT_ATTACHMENT: &str = r#"
INSERT INTO attachments (id, entry_id, file_name, file_url, content_type, size_bytes, object_key, uploaded_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

pub const SELECT_ATTACHMENTS_FOR_ENTRY: &str = r#"
SELECT id, entry_id, file_name, file_url, content_type, size_bytes, object_key, uploaded_at
FROM attachments
WHERE entry_id = ?1
ORDER BY uploaded_at ASC
"#;

pub const SELECT_ATTACHMENT_FOR_OWNER: &str = r#"
SELECT a.id, a.entry_id, a.file_name, a.file_url, a.content_type, a.size_bytes, a.object_key, a.uploaded_at
FROM attachments a
INNER JOIN entries e ON e.id = a.entry_id
WHERE a.id = ?1 AND e.user_id = ?2
"#;

pub const DELETE_ATTACHMENT: &str = r#"
DELETE FROM attachments
WHERE id = ?1
"#;

// Analytics queries
pub const COUNT_ENTRIES: &str = r#"
SELECT COUNT(*) FROM entries
WHERE user_id = ?1
"#;

pub const COUNT_ENTRIES_IN_RANGE: &str = r#"
SELECT COUNT(*) FROM entries
WHERE user_id = ?1
  AND (?2 IS NULL OR date >= ?2)
  AND (?3 IS NULL OR date <= ?3)
"#;

pub const SELECT_DISTINCT_DATES: &str = r#"
SELECT DISTINCT date FROM entries
WHERE user_id = ?1
ORDER BY date ASC
"#;

/// Ties go to the alphabetically first name.
pub const SELECT_MOST_USED_TAG: &str = r#"
SELECT t.name, COUNT(*) AS uses
FROM entry_tags et
INNER JOIN tags t ON t.id = et.tag_id
INNER JOIN entries e ON e.id = et.entry_id
WHERE e.user_id = ?1
GROUP BY t.name
ORDER BY uses DESC, t.name ASC
LIMIT 1
"#;

/// ?2 and ?3 are optional inclusive bounds.
pub const SELECT_HEATMAP: &str = r#"
SELECT date, COUNT(*) AS count
FROM entries
WHERE user_id = ?1
  AND (?2 IS NULL OR date >= ?2)
  AND (?3 IS NULL OR date <= ?3)
GROUP BY date
ORDER BY date ASC
"#;

/// Islands-and-gaps streaks: ?1 user, ?2 today, ?3 yesterday.
///
/// Consecutive days share `julianday(d) - ROW_NUMBER()`, so grouping on that
/// value yields one row per run. The current streak counts from the start of
/// the run holding today (or, failing that, yesterday) up to that anchor.
pub const SELECT_STREAKS: &str = r#"
WITH days AS (
    SELECT DISTINCT date AS d FROM entries WHERE user_id = ?1
),
islands AS (
    SELECT d, julianday(d) - ROW_NUMBER() OVER (ORDER BY d) AS grp FROM days
),
runs AS (
    SELECT MIN(d) AS start_day, MAX(d) AS end_day, COUNT(*) AS len
    FROM islands
    GROUP BY grp
)
SELECT
    COALESCE(MAX(CASE
        WHEN start_day <= ?2 AND end_day >= ?2
            THEN CAST(julianday(?2) - julianday(start_day) AS INTEGER) + 1
        WHEN start_day <= ?3 AND end_day >= ?3
            THEN CAST(julianday(?3) - julianday(start_day) AS INTEGER) + 1
        ELSE 0
    END), 0) AS current_streak,
    COALESCE(MAX(len), 0) AS longest_streak
FROM runs
"#;
