//! Request payloads for entry operations.
//!
//! Pure data plus the conversions that turn a validated payload into domain
//! types. Tag IDs minted here are provisional; the store swaps them for the
//! owner's existing tag IDs on write.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serde::{deserialize_optional_date, deserialize_optional_string};

use super::error::JournalError;
use super::operations::{build_links, normalize_tag_name, normalize_tags, normalize_title};
use super::types::{Entry, Tag};

/// Smallest page size accepted by the list endpoint.
pub const MIN_PAGE_LIMIT: u32 = 1;
/// Largest page size accepted by the list endpoint.
pub const MAX_PAGE_LIMIT: u32 = 1000;
/// Page size used when none is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// A link as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInput {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

impl LinkInput {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: None,
            url: url.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Request payload for creating a new entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

impl CreateEntryRequest {
    pub fn new(date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            date,
            title: None,
            content: content.into(),
            tags: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link(mut self, link: LinkInput) -> Self {
        self.links.push(link);
        self
    }

    /// Validates the payload and builds the entry owned by `user_id`.
    pub fn into_entry(self, user_id: Uuid) -> Result<Entry, JournalError> {
        let links = build_links(self.links)?;
        let mut entry = Entry::new(user_id, self.date, self.content);
        entry.title = normalize_title(self.title);
        entry.tags = normalize_tags(&self.tags).into_iter().map(Tag::new).collect();
        entry.links = links;
        super::operations::validate_entry(&entry)?;
        Ok(entry)
    }
}

/// Request payload for updating an entry.
///
/// Absent fields are left untouched. `tags` and `links`, when present,
/// replace the whole list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkInput>>,
}

impl UpdateEntryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Applies the updates to `entry`, leaving it untouched on error.
    pub fn apply_to(self, entry: &mut Entry) -> Result<(), JournalError> {
        let mut updated = entry.clone();

        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(title) = self.title {
            updated.title = normalize_title(Some(title));
        }
        if let Some(content) = self.content {
            updated.content = content;
        }
        if let Some(tags) = self.tags {
            updated.tags = normalize_tags(&tags)
                .into_iter()
                .map(|name| {
                    // Keep the ID of tags the entry already carries.
                    entry
                        .tags
                        .iter()
                        .find(|tag| tag.name == name)
                        .cloned()
                        .unwrap_or_else(|| Tag::new(name))
                })
                .collect();
        }
        if let Some(links) = self.links {
            updated.links = build_links(links)?;
        }

        super::operations::validate_entry(&updated)?;
        updated.updated_at = Utc::now();
        *entry = updated;
        Ok(())
    }
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

/// Filters and pagination for listing entries.
///
/// Empty query-string values are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub tag: Option<String>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            date: None,
            tag: None,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl EntryQuery {
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Checks pagination bounds.
    pub fn validate(&self) -> Result<(), JournalError> {
        if !(MIN_PAGE_LIMIT..=MAX_PAGE_LIMIT).contains(&self.limit) {
            return Err(JournalError::InvalidLimit {
                min: MIN_PAGE_LIMIT,
                max: MAX_PAGE_LIMIT,
                got: self.limit,
            });
        }
        Ok(())
    }

    /// The tag filter, normalized the same way stored tags are.
    pub fn normalized_tag(&self) -> Option<String> {
        self.tag.as_deref().and_then(normalize_tag_name)
    }

    /// Returns true if `entry` passes the date and tag filters.
    pub fn matches(&self, entry: &Entry) -> bool {
        self.date.is_none_or(|date| entry.date == date)
            && self.normalized_tag().is_none_or(|tag| entry.has_tag(&tag))
    }
}
