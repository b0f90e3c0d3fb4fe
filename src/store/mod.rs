pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use cnidarium::{StateDelta, StateRead, StateWrite, Storage};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::research::Category;
use types::{ArchiveRecord, FeedbackEntry, RuleSet};

// Key prefixes (no trailing slashes — cnidarium convention)
const RULES_PREFIX: &str = "rules";
const ARCHIVE_PREFIX: &str = "archive";

const GENERAL_RULES_KEY: &str = "rules/general";
const CATEGORY_RULES_PREFIX: &str = "rules/category";
const FEEDBACK_PREFIX: &str = "rules/feedback";

fn category_key(category: &str) -> String {
    format!("{}/{}", CATEGORY_RULES_PREFIX, category)
}
/// Zero-padded timestamp first so keys sort chronologically.
fn feedback_key(timestamp: i64, id: &str) -> String {
    format!("{}/{:020}-{}", FEEDBACK_PREFIX, timestamp, id)
}
fn archive_key(timestamp: i64, id: &str) -> String {
    format!("{}/{:020}-{}", ARCHIVE_PREFIX, timestamp, id)
}

/// Short content-addressed id.
fn short_id(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex()[..16].to_string()
}

/// Rule base and report archive.
pub struct AuditStore {
    storage: Storage,
    /// Held from snapshot to commit. cnidarium rejects a delta built on a
    /// snapshot that another commit has already superseded.
    write_lock: Mutex<()>,
}

impl AuditStore {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let prefixes = vec![RULES_PREFIX.to_string(), ARCHIVE_PREFIX.to_string()];
        let storage = Storage::load(data_dir.to_path_buf(), prefixes)
            .await
            .context("Failed to init cnidarium storage")?;
        Ok(Self {
            storage,
            write_lock: Mutex::new(()),
        })
    }

    /// Read a text block; missing keys read as empty.
    async fn get_text(&self, key: &str) -> Result<String> {
        let snapshot = self.storage.latest_snapshot();
        let bytes = snapshot.get_raw(key).await?.unwrap_or_default();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn put_raw(&self, key: String, value: Vec<u8>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.storage.latest_snapshot();
        let mut delta = StateDelta::new(snapshot);
        delta.put_raw(key, value);
        self.storage.commit(delta).await?;
        Ok(())
    }

    async fn put_text(&self, key: String, text: &str) -> Result<()> {
        self.put_raw(key, text.as_bytes().to_vec()).await
    }

    pub async fn general_rules(&self) -> Result<String> {
        self.get_text(GENERAL_RULES_KEY).await
    }

    pub async fn category_rules(&self, category: &str) -> Result<String> {
        self.get_text(&category_key(category)).await
    }

    pub async fn set_general_rules(&self, text: &str) -> Result<()> {
        self.put_text(GENERAL_RULES_KEY.to_string(), text).await?;
        debug!(len = text.len(), "general rules updated");
        Ok(())
    }

    pub async fn set_category_rules(&self, category: &str, text: &str) -> Result<()> {
        self.put_text(category_key(category), text).await?;
        debug!(category, len = text.len(), "category rules updated");
        Ok(())
    }

    /// Categories that have a rules block stored.
    pub async fn rule_categories(&self) -> Result<Vec<String>> {
        let snapshot = self.storage.latest_snapshot();
        let prefix = format!("{}/", CATEGORY_RULES_PREFIX);
        let mut stream = snapshot.prefix_raw(&prefix);
        let mut categories = Vec::new();

        while let Some(entry) = stream.next().await {
            match entry {
                Ok((key, _)) => {
                    if let Some(name) = key.strip_prefix(&prefix) {
                        categories.push(name.to_string());
                    }
                }
                Err(e) => warn!("Error reading category rules: {}", e),
            }
        }

        categories.sort();
        Ok(categories)
    }

    pub async fn add_feedback(&self, author: &str, text: &str) -> Result<FeedbackEntry> {
        self.add_feedback_at(chrono::Utc::now().timestamp(), author, text)
            .await
    }

    async fn add_feedback_at(&self, timestamp: i64, author: &str, text: &str) -> Result<FeedbackEntry> {
        let entry = FeedbackEntry {
            id: short_id(&[&timestamp.to_string(), author, text]),
            timestamp,
            author: author.to_string(),
            text: text.to_string(),
        };

        self.put_raw(
            feedback_key(entry.timestamp, &entry.id),
            serde_json::to_vec(&entry).context("serialize FeedbackEntry")?,
        )
        .await?;
        debug!(feedback_id = %entry.id, author, "feedback recorded");
        Ok(entry)
    }

    /// Feedback log, oldest first.
    pub async fn feedback_log(&self) -> Result<Vec<FeedbackEntry>> {
        let mut entries: Vec<FeedbackEntry> = self.read_json_prefix(FEEDBACK_PREFIX).await;
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    /// Everything the report prompt needs from the rule base for `category`.
    pub async fn load_rules(&self, category: &Category) -> Result<RuleSet> {
        Ok(RuleSet {
            general: self.general_rules().await?,
            category: self.category_rules(category.name()).await?,
            feedback: types::render_feedback(&self.feedback_log().await?),
        })
    }

    pub async fn archive(
        &self,
        deal_name: &str,
        category: &str,
        score: &str,
        report: &str,
    ) -> Result<ArchiveRecord> {
        let timestamp = chrono::Utc::now().timestamp();
        self.archive_at(timestamp, deal_name, category, score, report)
            .await
    }

    async fn archive_at(
        &self,
        timestamp: i64,
        deal_name: &str,
        category: &str,
        score: &str,
        report: &str,
    ) -> Result<ArchiveRecord> {
        let record = ArchiveRecord {
            id: short_id(&[&timestamp.to_string(), deal_name, report]),
            timestamp,
            deal_name: deal_name.to_string(),
            category: category.to_string(),
            score: score.to_string(),
            report: report.to_string(),
        };

        self.put_raw(
            archive_key(record.timestamp, &record.id),
            serde_json::to_vec(&record).context("serialize ArchiveRecord")?,
        )
        .await?;
        debug!(archive_id = %record.id, deal_name, score, "report archived");
        Ok(record)
    }

    /// Archived reports, newest first.
    pub async fn list_archive(&self, limit: usize) -> Result<Vec<ArchiveRecord>> {
        let mut records: Vec<ArchiveRecord> = self.read_json_prefix(ARCHIVE_PREFIX).await;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }

    /// Decode every JSON value under `prefix`, skipping unreadable entries.
    async fn read_json_prefix<T: serde::de::DeserializeOwned>(&self, prefix: &str) -> Vec<T> {
        let snapshot = self.storage.latest_snapshot();
        let mut stream = snapshot.prefix_raw(prefix);
        let mut results = Vec::new();

        while let Some(entry) = stream.next().await {
            match entry {
                Ok((key, value)) => match serde_json::from_slice::<T>(&value) {
                    Ok(item) => results.push(item),
                    Err(e) => warn!(key = %key, "Skipping undecodable record: {}", e),
                },
                Err(e) => warn!("Error reading {} stream: {}", prefix, e),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sort_chronologically() {
        let earlier = archive_key(999, "ffff");
        let later = archive_key(1_000, "0000");
        assert!(earlier < later);
        assert_eq!(feedback_key(5, "ab"), "rules/feedback/00000000000000000005-ab");
    }

    #[test]
    fn test_category_key() {
        assert_eq!(category_key("Restaurant"), "rules/category/Restaurant");
    }

    #[test]
    fn test_short_id_is_stable() {
        let a = short_id(&["1", "Deal", "report"]);
        assert_eq!(a.len(), 16);
        assert_eq!(a, short_id(&["1", "Deal", "report"]));
        assert_ne!(a, short_id(&["1", "Dealr", "eport"]));
    }

    #[tokio::test]
    async fn test_rules_and_archive_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuditStore::new(dir.path()).await.unwrap();

        // Missing blocks read as empty
        assert_eq!(store.general_rules().await.unwrap(), "");
        assert_eq!(store.category_rules("Restaurant").await.unwrap(), "");
        assert!(store.rule_categories().await.unwrap().is_empty());
        assert!(store.list_archive(10).await.unwrap().is_empty());

        store.set_general_rules("Prices include VAT.").await.unwrap();
        store
            .set_category_rules("Restaurant", "Menu must list every course.")
            .await
            .unwrap();
        store.set_category_rules("Hotel", "Breakfast must be stated.").await.unwrap();
        assert_eq!(store.rule_categories().await.unwrap(), vec!["Hotel", "Restaurant"]);

        store
            .add_feedback_at(1_700_086_400, "rev", "Second note.")
            .await
            .unwrap();
        store
            .add_feedback_at(1_700_000_000, "rev", "First note.")
            .await
            .unwrap();
        let log = store.feedback_log().await.unwrap();
        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["First note.", "Second note."]);

        let rules = store.load_rules(&Category::Restaurant).await.unwrap();
        assert_eq!(rules.general, "Prices include VAT.");
        assert_eq!(rules.category, "Menu must list every course.");
        assert_eq!(
            rules.feedback,
            "- [2023-11-14] First note.\n- [2023-11-15] Second note."
        );

        store
            .archive_at(1_700_000_000, "Older deal", "Restaurant", "70", "report a")
            .await
            .unwrap();
        store
            .archive_at(1_700_000_500, "Newer deal", "Hotel & Spa", "N/A", "report b")
            .await
            .unwrap();
        let records = store.list_archive(10).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.deal_name.as_str()).collect();
        assert_eq!(names, vec!["Newer deal", "Older deal"]);
        assert_eq!(records[0].category, "Hotel & Spa");
        assert_eq!(records[0].score, "N/A");

        let latest = store.list_archive(1).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].deal_name, "Newer deal");
    }

    #[tokio::test]
    async fn test_concurrent_writes_all_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuditStore::new(dir.path()).await.unwrap();

        let archives = (0..8).map(|i| {
            let store = &store;
            async move {
                store
                    .archive(&format!("Deal {}", i), "Retail", "50", "report")
                    .await
            }
        });
        let feedback = (0..8).map(|i| {
            let store = &store;
            async move { store.add_feedback("rev", &format!("note {}", i)).await }
        });

        let (archived, noted) = tokio::join!(
            futures::future::join_all(archives),
            futures::future::join_all(feedback)
        );
        assert!(archived.iter().all(|r| r.is_ok()));
        assert!(noted.iter().all(|r| r.is_ok()));

        assert_eq!(store.list_archive(100).await.unwrap().len(), 8);
        assert_eq!(store.feedback_log().await.unwrap().len(), 8);
    }
}
