use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// PHC-formatted password hash. Never serialized.
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with the given (already normalized) email and hash.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A user-scoped label. Tag names are stored normalized (trimmed, lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// An external reference attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub title: Option<String>,
    pub url: String,
}

impl Link {
    pub fn new(title: Option<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            url: url.into(),
        }
    }
}

/// A file uploaded against an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Location inside the object store.
    #[serde(default, skip_serializing)]
    pub object_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A dated journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// The day this entry is about. Drives streaks and the heatmap.
    pub date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Entry {
    /// Creates a new entry for `user_id` on `date`.
    pub fn new(user_id: Uuid, date: NaiveDate, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            title: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            links: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Sets the title for this entry.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the tags with fresh tags named `names`.
    ///
    /// Names are expected to be normalized already.
    pub fn with_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = names.into_iter().map(Tag::new).collect();
        self
    }

    /// Appends a link.
    pub fn with_link(mut self, title: Option<String>, url: impl Into<String>) -> Self {
        self.links.push(Link::new(title, url));
        self
    }

    /// Sets a specific ID for this entry (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the creation timestamp (useful for testing ordering).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    /// Returns true if this entry carries a tag named `name`.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Returns the tag names in their stored order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}

/// One page of a filtered entry listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    /// Number of entries matching the filters, ignoring pagination.
    pub total: u64,
}
