//! Bar repository over a list store.
//!
//! Each record is stored as one compact JSON object per list entry. JSON keeps
//! booleans, floats, nulls and nested mappings intact, so reading an entry back
//! gives the exact mapping that was appended.

use std::sync::Arc;
use tracing::debug;

use super::ListStore;
use crate::bar::BarRecord;
use crate::error::StoreError;

/// List key bars are appended to
pub const DEFAULT_BAR_KEY: &str = "bars";

/// Stores and retrieves bar records in a single named list.
#[derive(Clone)]
pub struct BarRepository {
    store: Arc<dyn ListStore>,
    key: String,
}

impl BarRepository {
    pub fn new(store: Arc<dyn ListStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Repository over the `"bars"` list
    pub fn with_default_key(store: Arc<dyn ListStore>) -> Self {
        Self::new(store, DEFAULT_BAR_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Append one record to the tail of the list.
    pub async fn append(&self, record: &BarRecord) -> Result<(), StoreError> {
        let value = encode_record(record)?;
        self.store.rpush(&self.key, value).await
    }

    /// Records in the inclusive range `[start, end]`; negative indices count
    /// from the tail.
    ///
    /// Entries are decoded as stored and not re-validated. One undecodable
    /// entry fails the whole call.
    pub async fn read_range(&self, start: isize, end: isize) -> Result<Vec<BarRecord>, StoreError> {
        let items = self.store.lrange(&self.key, start, end).await?;
        debug!(key = %self.key, start, end, count = items.len(), "read bar range");

        items
            .iter()
            .enumerate()
            .map(|(index, item)| decode_record(item).map_err(|source| StoreError::Parse { index, source }))
            .collect()
    }

    /// The whole list
    pub async fn read_all(&self) -> Result<Vec<BarRecord>, StoreError> {
        self.read_range(0, -1).await
    }
}

/// Text form of a record
pub fn encode_record(record: &BarRecord) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(StoreError::Serialize)
}

/// Record from its text form
pub fn decode_record(text: &str) -> Result<BarRecord, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::object::tests::sample_bar;
    use crate::database::MemoryListStore;
    use serde_json::{json, Value};

    fn repository() -> (Arc<MemoryListStore>, BarRepository) {
        let store = Arc::new(MemoryListStore::new());
        let repo = BarRepository::with_default_key(store.clone());
        (store, repo)
    }

    fn record_with(field: &str, value: Value) -> BarRecord {
        let mut record = sample_bar().to_record().unwrap();
        record.insert(field.to_string(), value);
        record
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let records = vec![
            sample_bar().to_record().unwrap(),
            record_with(
                "quality",
                json!({ "filled": true, "had_gap": false, "score": 0.1, "nested": { "n": null } }),
            ),
            record_with("imbalance_dir", json!("down")),
            record_with("close", json!(0.30000000000000004)),
            record_with("volume", json!(1e-300)),
            record_with("ts_emit_ms", json!(i64::MAX)),
        ];

        for record in records {
            let text = encode_record(&record).unwrap();
            assert_eq!(decode_record(&text).unwrap(), record);
        }
    }

    #[tokio::test]
    async fn test_append_uses_key() {
        let store = Arc::new(MemoryListStore::new());
        let repo = BarRepository::new(store.clone(), "bars:1m");
        repo.append(&sample_bar().to_record().unwrap()).await.unwrap();

        assert_eq!(repo.key(), "bars:1m");
        assert_eq!(store.len("bars:1m"), 1);
        assert_eq!(store.len(DEFAULT_BAR_KEY), 0);
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let (_, repo) = repository();
        let records: Vec<BarRecord> = ["A", "B", "C"]
            .iter()
            .map(|symbol| record_with("venue_symbol", json!(symbol)))
            .collect();

        for record in &records {
            repo.append(record).await.unwrap();
        }

        assert_eq!(repo.read_range(0, -1).await.unwrap(), records);
        assert_eq!(repo.read_all().await.unwrap(), records);
        assert_eq!(repo.read_range(-1, -1).await.unwrap(), vec![records[2].clone()]);
        assert_eq!(repo.read_range(0, 0).await.unwrap(), vec![records[0].clone()]);
    }

    #[tokio::test]
    async fn test_read_empty_list() {
        let (_, repo) = repository();
        assert!(repo.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_fails_read() {
        let (store, repo) = repository();
        repo.append(&sample_bar().to_record().unwrap()).await.unwrap();
        store
            .rpush(DEFAULT_BAR_KEY, "{'tf': '1m', 'is_final': True}".to_string())
            .await
            .unwrap();

        let err = repo.read_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { index: 1, .. }));

        // Entries before the corrupt one are still readable on their own.
        assert_eq!(repo.read_range(0, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_object_entry_fails_read() {
        let (store, repo) = repository();
        store.rpush(DEFAULT_BAR_KEY, "[1, 2]".to_string()).await.unwrap();
        assert!(matches!(repo.read_all().await, Err(StoreError::Parse { index: 0, .. })));
    }
}
