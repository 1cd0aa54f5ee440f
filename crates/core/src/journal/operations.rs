use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::JournalError;
use super::requests::{EntryQuery, LinkInput};
use super::types::{Entry, EntryPage, Link};

/// Normalizes a single tag name: trimmed and lowercased. Blank names yield `None`.
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag names, keeping first-seen order.
pub fn normalize_tags<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|name| normalize_tag_name(name.as_ref()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Trims a title, collapsing blank titles to `None`.
pub fn normalize_title(title: Option<String>) -> Option<String> {
    title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Converts submitted links into domain links, rejecting blank URLs.
pub fn build_links(links: Vec<LinkInput>) -> Result<Vec<Link>, JournalError> {
    links
        .into_iter()
        .map(|link| {
            let url = link.url.trim();
            if url.is_empty() {
                return Err(JournalError::EmptyLinkUrl);
            }
            Ok(Link::new(normalize_title(link.title), url))
        })
        .collect()
}

/// Validates an entry before creation or update.
pub fn validate_entry(entry: &Entry) -> Result<(), JournalError> {
    if entry.content.trim().is_empty() {
        return Err(JournalError::EmptyContent);
    }
    if entry.links.iter().any(|link| link.url.trim().is_empty()) {
        return Err(JournalError::EmptyLinkUrl);
    }
    Ok(())
}

/// Listing order: most recent date first, then most recently created.
pub fn compare_newest_first(a: &Entry, b: &Entry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Filters, orders and paginates `entries` according to `query`.
///
/// `entries` must already be scoped to a single user.
pub fn paginate_entries(entries: Vec<Entry>, query: &EntryQuery) -> EntryPage {
    let mut matching: Vec<Entry> = entries
        .into_iter()
        .filter(|entry| query.matches(entry))
        .collect();
    matching.sort_by(compare_newest_first);

    let total = matching.len() as u64;
    let entries = matching
        .into_iter()
        .skip(query.offset as usize)
        .take(query.limit as usize)
        .collect();

    EntryPage { entries, total }
}
