//! In-memory repository implementation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use growthgrid_core::analytics::{aggregate_heatmap, pick_most_used_tag, tag_usage, HeatmapPoint};
use growthgrid_core::journal::{paginate_entries, Attachment, Entry, EntryPage, EntryQuery, Tag, User};
use growthgrid_core::storage::{
    AnalyticsRepository, AttachmentRepository, DateRange, EntryRepository, HealthCheck,
    RepositoryError, Result, UserRepository,
};

/// All tables, guarded by one lock so cascades and tag resolution are atomic.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    entries: HashMap<Uuid, Entry>,
    /// Tag identities per owner, keyed by (user_id, name).
    tags: HashMap<(Uuid, String), Tag>,
    attachments: HashMap<Uuid, Attachment>,
}

impl Tables {
    /// Replaces each tag with the owner's existing tag of the same name,
    /// registering the ones seen for the first time.
    fn resolve_tags(&mut self, user_id: Uuid, tags: &[Tag]) -> Vec<Tag> {
        tags.iter()
            .map(|tag| {
                self.tags
                    .entry((user_id, tag.name.clone()))
                    .or_insert_with(|| tag.clone())
                    .clone()
            })
            .collect()
    }

    /// Returns a copy of `entry` with its attachment records filled in.
    fn hydrate(&self, entry: &Entry) -> Entry {
        let mut attachments: Vec<Attachment> = self
            .attachments
            .values()
            .filter(|a| a.entry_id == entry.id)
            .cloned()
            .collect();
        attachments.sort_by_key(|a| a.uploaded_at);

        let mut hydrated = entry.clone();
        hydrated.attachments = attachments;
        hydrated
    }

    fn owned_entries(&self, user_id: Uuid) -> impl Iterator<Item = &Entry> {
        self.entries.values().filter(move |e| e.user_id == user_id)
    }

    fn remove_entry(&mut self, id: Uuid) {
        self.entries.remove(&id);
        self.attachments.retain(|_, a| a.entry_id != id);
    }
}

/// In-memory storage backend.
///
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn entry_not_found(id: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Entry",
        id: id.to_string(),
    }
}

#[async_trait]
impl EntryRepository for InMemoryRepository {
    async fn get_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<Entry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .get(&id)
            .filter(|e| e.user_id == user_id)
            .map(|e| tables.hydrate(e)))
    }

    async fn list_entries(&self, user_id: Uuid, query: &EntryQuery) -> Result<EntryPage> {
        let tables = self.tables.read().await;
        let entries = tables
            .owned_entries(user_id)
            .filter(|e| query.matches(e))
            .map(|e| tables.hydrate(e))
            .collect();
        Ok(paginate_entries(entries, query))
    }

    async fn list_tags(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let names: BTreeSet<&str> = tables
            .owned_entries(user_id)
            .flat_map(|e| e.tags.iter().map(|t| t.name.as_str()))
            .collect();
        Ok(names.into_iter().map(String::from).collect())
    }

    async fn create_entry(&self, entry: &Entry) -> Result<Entry> {
        let mut tables = self.tables.write().await;
        if tables.entries.contains_key(&entry.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Entry",
                id: entry.id.to_string(),
            });
        }

        let mut stored = entry.clone();
        stored.tags = tables.resolve_tags(entry.user_id, &entry.tags);
        stored.attachments.clear();
        tables.entries.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .entries
            .get(&entry.id)
            .is_some_and(|e| e.user_id == entry.user_id);
        if !owned {
            return Err(entry_not_found(entry.id));
        }

        let mut stored = entry.clone();
        stored.tags = tables.resolve_tags(entry.user_id, &entry.tags);
        stored.attachments.clear();
        tables.entries.insert(stored.id, stored.clone());

        Ok(tables.hydrate(&stored))
    }

    async fn delete_entry(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .entries
            .get(&id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Err(entry_not_found(id));
        }
        tables.remove_entry(id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.email.clone(),
            });
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "User",
                id: id.to_string(),
            });
        }

        let owned: Vec<Uuid> = tables.owned_entries(id).map(|e| e.id).collect();
        for entry_id in owned {
            tables.remove_entry(entry_id);
        }
        tables.tags.retain(|(owner, _), _| *owner != id);
        Ok(())
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryRepository {
    async fn create_attachment(&self, attachment: &Attachment) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.entries.contains_key(&attachment.entry_id) {
            return Err(entry_not_found(attachment.entry_id));
        }
        if tables.attachments.contains_key(&attachment.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Attachment",
                id: attachment.id.to_string(),
            });
        }
        tables.attachments.insert(attachment.id, attachment.clone());
        Ok(())
    }

    async fn get_attachment(&self, user_id: Uuid, id: Uuid) -> Result<Option<Attachment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attachments
            .get(&id)
            .filter(|a| {
                tables
                    .entries
                    .get(&a.entry_id)
                    .is_some_and(|e| e.user_id == user_id)
            })
            .cloned())
    }

    async fn delete_attachment(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.attachments.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Attachment",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryRepository {
    async fn count_entries(&self, user_id: Uuid) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.owned_entries(user_id).count() as u64)
    }

    async fn count_entries_in(&self, user_id: Uuid, range: DateRange) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .owned_entries(user_id)
            .filter(|e| range.contains(e.date))
            .count() as u64)
    }

    async fn distinct_entry_dates(&self, user_id: Uuid) -> Result<BTreeSet<NaiveDate>> {
        let tables = self.tables.read().await;
        Ok(tables.owned_entries(user_id).map(|e| e.date).collect())
    }

    async fn most_used_tag(&self, user_id: Uuid) -> Result<Option<String>> {
        let tables = self.tables.read().await;
        let usage = tag_usage(tables.owned_entries(user_id).map(|e| e.tag_names()));
        Ok(pick_most_used_tag(usage))
    }

    async fn heatmap_counts(&self, user_id: Uuid, range: DateRange) -> Result<Vec<HeatmapPoint>> {
        let tables = self.tables.read().await;
        Ok(aggregate_heatmap(
            tables.owned_entries(user_id).map(|e| e.date),
            &range,
        ))
    }
}

#[async_trait]
impl HealthCheck for InMemoryRepository {
    async fn ping(&self) -> Result<()> {
        let _tables = self.tables.read().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use growthgrid_core::analytics::StreakResult;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    async fn repo_with_user() -> (InMemoryRepository, User) {
        let repo = InMemoryRepository::new();
        let user = User::new("alice@example.com", "hash");
        repo.create_user(&user).await.unwrap();
        (repo, user)
    }

    fn attachment_for(entry_id: Uuid) -> Attachment {
        Attachment {
            id: Uuid::new_v4(),
            entry_id,
            file_name: "notes.pdf".to_string(),
            file_url: "http://localhost:3000/files/entries/x/notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 42,
            object_key: format!("entries/{entry_id}/abcd1234_notes.pdf"),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_entry_create_and_get() {
        let (repo, user) = repo_with_user().await;
        let entry = Entry::new(user.id, date(1), "Read the book").with_tags(["rust"]);

        let created = repo.create_entry(&entry).await.unwrap();
        let retrieved = repo.get_entry(user.id, entry.id).await.unwrap();

        assert_eq!(retrieved, Some(created));
    }

    #[tokio::test]
    async fn test_entry_hidden_from_other_users() {
        let (repo, user) = repo_with_user().await;
        let entry = Entry::new(user.id, date(1), "private");
        repo.create_entry(&entry).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(repo.get_entry(stranger, entry.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_entry(stranger, entry.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
        let mut hijacked = entry.clone();
        hijacked.user_id = stranger;
        assert!(matches!(
            repo.update_entry(&hijacked).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_tags_reused_per_user() {
        let (repo, user) = repo_with_user().await;
        let other = Uuid::new_v4();

        let first = repo
            .create_entry(&Entry::new(user.id, date(1), "a").with_tags(["rust"]))
            .await
            .unwrap();
        let second = repo
            .create_entry(&Entry::new(user.id, date(2), "b").with_tags(["rust", "async"]))
            .await
            .unwrap();
        let foreign = repo
            .create_entry(&Entry::new(other, date(2), "c").with_tags(["rust"]))
            .await
            .unwrap();

        assert_eq!(first.tags[0].id, second.tags[0].id);
        assert_ne!(first.tags[0].id, foreign.tags[0].id);
        assert_eq!(second.tag_names(), vec!["rust", "async"]);
    }

    #[tokio::test]
    async fn test_entry_update() {
        let (repo, user) = repo_with_user().await;
        let entry = repo
            .create_entry(&Entry::new(user.id, date(1), "draft").with_tags(["rust"]))
            .await
            .unwrap();

        let mut edited = entry.clone();
        edited.content = "final".to_string();
        edited.tags = vec![Tag::new("rust"), Tag::new("tokio")];
        let updated = repo.update_entry(&edited).await.unwrap();

        assert_eq!(updated.content, "final");
        assert_eq!(updated.tags[0].id, entry.tags[0].id);
        assert_eq!(
            repo.list_tags(user.id).await.unwrap(),
            vec!["rust".to_string(), "tokio".to_string()]
        );
    }

    #[tokio::test]
    async fn test_list_entries_filters_and_paginates() {
        let (repo, user) = repo_with_user().await;
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        for (i, day) in [1, 2, 2, 3].into_iter().enumerate() {
            let tags: &[&str] = if day == 2 { &["rust"] } else { &[] };
            repo.create_entry(
                &Entry::new(user.id, date(day), format!("entry {i}"))
                    .with_tags(tags.iter().copied())
                    .with_created_at(base + Duration::minutes(i as i64)),
            )
            .await
            .unwrap();
        }

        let all = repo
            .list_entries(user.id, &EntryQuery::default())
            .await
            .unwrap();
        assert_eq!(all.total, 4);
        assert_eq!(all.entries[0].date, date(3));
        assert_eq!(all.entries[1].content, "entry 2");

        let tagged = repo
            .list_entries(user.id, &EntryQuery::default().with_tag(" Rust "))
            .await
            .unwrap();
        assert_eq!(tagged.total, 2);

        let page = repo
            .list_entries(user.id, &EntryQuery::default().with_page(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].content, "entry 2");
    }

    #[tokio::test]
    async fn test_delete_entry_cascades_attachments() {
        let (repo, user) = repo_with_user().await;
        let entry = repo
            .create_entry(&Entry::new(user.id, date(1), "with file"))
            .await
            .unwrap();
        let attachment = attachment_for(entry.id);
        repo.create_attachment(&attachment).await.unwrap();

        let hydrated = repo.get_entry(user.id, entry.id).await.unwrap().unwrap();
        assert_eq!(hydrated.attachments, vec![attachment.clone()]);

        repo.delete_entry(user.id, entry.id).await.unwrap();

        assert!(repo
            .get_attachment(user.id, attachment.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_attachment_scoped_to_owner() {
        let (repo, user) = repo_with_user().await;
        let entry = repo
            .create_entry(&Entry::new(user.id, date(1), "with file"))
            .await
            .unwrap();
        let attachment = attachment_for(entry.id);
        repo.create_attachment(&attachment).await.unwrap();

        assert!(repo
            .get_attachment(Uuid::new_v4(), attachment.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .get_attachment(user.id, attachment.id)
            .await
            .unwrap()
            .is_some());

        repo.delete_attachment(attachment.id).await.unwrap();
        assert!(matches!(
            repo.delete_attachment(attachment.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_attachment_requires_entry() {
        let repo = InMemoryRepository::new();
        let result = repo.create_attachment(&attachment_for(Uuid::new_v4())).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_user_create_and_get() {
        let (repo, user) = repo_with_user().await;

        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.get_user_by_email("alice@example.com").await.unwrap(),
            Some(user)
        );
        assert!(repo
            .get_user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_user_duplicate_email() {
        let (repo, _user) = repo_with_user().await;
        let twin = User::new("alice@example.com", "other");

        let result = repo.create_user(&twin).await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_update() {
        let (repo, mut user) = repo_with_user().await;
        user.password_hash = "rotated".to_string();

        repo.update_user(&user).await.unwrap();

        let retrieved = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(retrieved.password_hash, "rotated");
    }

    #[tokio::test]
    async fn test_user_delete_cascades() {
        let (repo, user) = repo_with_user().await;
        let entry = repo
            .create_entry(&Entry::new(user.id, date(1), "a").with_tags(["rust"]))
            .await
            .unwrap();
        repo.create_attachment(&attachment_for(entry.id))
            .await
            .unwrap();

        repo.delete_user(user.id).await.unwrap();

        assert!(repo.get_user(user.id).await.unwrap().is_none());
        assert_eq!(repo.count_entries(user.id).await.unwrap(), 0);
        assert!(repo.list_tags(user.id).await.unwrap().is_empty());
        let tables = repo.tables.read().await;
        assert!(tables.attachments.is_empty());
        assert!(tables.tags.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_queries() {
        let (repo, user) = repo_with_user().await;
        let other = Uuid::new_v4();
        for (day, tag) in [(1, "rust"), (2, "python"), (2, "python"), (3, "python")] {
            repo.create_entry(&Entry::new(user.id, date(day), "x").with_tags([tag]))
                .await
                .unwrap();
        }
        repo.create_entry(&Entry::new(other, date(3), "y").with_tags(["go"]))
            .await
            .unwrap();

        assert_eq!(repo.count_entries(user.id).await.unwrap(), 4);
        assert_eq!(
            repo.count_entries_in(user.id, DateRange::since(date(2)))
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            repo.count_entries_in(user.id, DateRange::between(date(1), date(2)))
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            repo.count_entries_in(user.id, DateRange::between(date(3), date(1)))
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            repo.distinct_entry_dates(user.id).await.unwrap(),
            BTreeSet::from([date(1), date(2), date(3)])
        );
        assert_eq!(
            repo.most_used_tag(user.id).await.unwrap(),
            Some("python".to_string())
        );
        assert_eq!(
            repo.heatmap_counts(user.id, DateRange::since(date(2)))
                .await
                .unwrap(),
            vec![HeatmapPoint::new(date(2), 2), HeatmapPoint::new(date(3), 1)]
        );
        assert_eq!(
            repo.streaks(user.id, date(4)).await.unwrap(),
            StreakResult {
                current_streak: 3,
                longest_streak: 3
            }
        );
    }

    #[tokio::test]
    async fn test_most_used_tag_tie_breaks_by_name() {
        let (repo, user) = repo_with_user().await;
        repo.create_entry(&Entry::new(user.id, date(1), "x").with_tags(["zig"]))
            .await
            .unwrap();
        repo.create_entry(&Entry::new(user.id, date(2), "y").with_tags(["ada"]))
            .await
            .unwrap();

        assert_eq!(
            repo.most_used_tag(user.id).await.unwrap(),
            Some("ada".to_string())
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let repo = InMemoryRepository::new();
        assert!(repo.ping().await.is_ok());
    }
}
