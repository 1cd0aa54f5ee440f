//! Structured cache keys.
//!
//! A key is an ordered tuple of segments. The first segment names the
//! aggregate kind, the second is the owning user, and anything after that
//! discriminates between variants of the same aggregate (date bounds, the
//! reference day). Invalidation matches on leading segments, never on
//! rendered strings.

use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::storage::DateRange;

/// Placeholder segment for an open date bound.
pub const OPEN_BOUND: &str = "-";

/// The aggregate a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Heatmap,
    Summary,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heatmap => "heatmap",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered tuple of key segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The key (or prefix) naming one aggregate kind for one user.
    pub fn for_user(kind: AggregateKind, user_id: Uuid) -> Self {
        Self::new([kind.as_str().to_string(), user_id.to_string()])
    }

    /// Appends a discriminator segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// The owning user, if the second segment is a UUID.
    pub fn owner_id(&self) -> Option<Uuid> {
        self.0.get(1).and_then(|owner| Uuid::parse_str(owner).ok())
    }

    /// Returns true if every segment of `prefix` equals the segment at the
    /// same position in this key.
    pub fn starts_with(&self, prefix: &CacheKey) -> bool {
        prefix.0.len() <= self.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}

fn bound_segment(bound: Option<NaiveDate>) -> String {
    bound.map_or_else(|| OPEN_BOUND.to_string(), |date| date.to_string())
}

/// Returns the cache key for a user's heatmap over `range`.
pub fn heatmap_key(user_id: Uuid, range: &DateRange) -> CacheKey {
    heatmap_prefix(user_id)
        .push(bound_segment(range.start))
        .push(bound_segment(range.end))
}

/// Returns the prefix matching every heatmap variant for a user.
pub fn heatmap_prefix(user_id: Uuid) -> CacheKey {
    CacheKey::for_user(AggregateKind::Heatmap, user_id)
}

/// Returns the cache key for a user's summary computed on `today`.
///
/// The reference day is part of the key so a summary cached just before
/// midnight is never served on the following day.
pub fn summary_key(user_id: Uuid, today: NaiveDate) -> CacheKey {
    summary_prefix(user_id).push(today.to_string())
}

/// Returns the prefix matching every summary variant for a user.
pub fn summary_prefix(user_id: Uuid) -> CacheKey {
    CacheKey::for_user(AggregateKind::Summary, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Uuid {
        Uuid::nil()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_heatmap_key_segments() {
        let key = heatmap_key(user(), &DateRange::new(Some(d(1)), None));

        assert_eq!(key.owner_id(), Some(user()));
        assert_eq!(
            key.to_string(),
            "heatmap:00000000-0000-0000-0000-000000000000:2024-01-01:-"
        );
    }

    #[test]
    fn test_unbounded_heatmap_key() {
        let key = heatmap_key(user(), &DateRange::all());
        assert!(key.to_string().ends_with(":-:-"));
    }

    #[test]
    fn test_summary_key_segments() {
        let key = summary_key(user(), d(31));
        assert_eq!(
            key.to_string(),
            "summary:00000000-0000-0000-0000-000000000000:2024-01-31"
        );
    }

    #[test]
    fn test_distinct_ranges_have_distinct_keys() {
        let a = heatmap_key(user(), &DateRange::between(d(1), d(2)));
        let b = heatmap_key(user(), &DateRange::between(d(1), d(3)));
        let c = heatmap_key(user(), &DateRange::since(d(1)));

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_starts_with_matches_whole_segments() {
        let key = heatmap_key(user(), &DateRange::all());

        assert!(key.starts_with(&heatmap_prefix(user())));
        assert!(key.starts_with(&CacheKey::new(["heatmap"])));
        assert!(key.starts_with(&key));
        assert!(!key.starts_with(&summary_prefix(user())));
        assert!(!key.starts_with(&CacheKey::new(["heat"])));
        assert!(!heatmap_prefix(user()).starts_with(&key));
    }

    #[test]
    fn test_owner_id() {
        assert_eq!(summary_key(user(), d(1)).owner_id(), Some(user()));
        assert_eq!(CacheKey::new(["summary"]).owner_id(), None);
        assert_eq!(CacheKey::new(["summary", "not-a-uuid"]).owner_id(), None);
    }
}
