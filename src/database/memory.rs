//! In-memory list store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::ListStore;
use crate::error::StoreError;

/// In-memory list store with Redis list semantics
pub struct MemoryListStore {
    lists: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries in the list at `key`
    pub fn len(&self, key: &str) -> usize {
        self.lists
            .read()
            .map(|lists| lists.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl Default for MemoryListStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `LRANGE` indices against a list of `len` entries.
///
/// Returns the half-open slice bounds, or `None` when the range is empty.
pub fn resolve_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };

    if start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize + 1))
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn rpush(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut lists = self.lists.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        lists.entry(key.to_string()).or_default().push(value);
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>, StoreError> {
        let lists = self.lists.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(list.len(), start, end) {
            Some((from, to)) => list[from..to].to_vec(),
            None => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(values: &[&str]) -> MemoryListStore {
        let store = MemoryListStore::new();
        for value in values {
            store.rpush("bars", value.to_string()).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_rpush_appends_to_tail() {
        let store = store_with(&["a", "b", "c"]).await;
        assert_eq!(store.len("bars"), 3);
        assert_eq!(store.lrange("bars", 0, -1).await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_negative_indices() {
        let store = store_with(&["a", "b", "c"]).await;
        assert_eq!(store.lrange("bars", -1, -1).await.unwrap(), vec!["c"]);
        assert_eq!(store.lrange("bars", -2, -1).await.unwrap(), vec!["b", "c"]);
        assert_eq!(store.lrange("bars", -100, 0).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let store = store_with(&["a", "b", "c"]).await;
        assert_eq!(store.lrange("bars", 1, 100).await.unwrap(), vec!["b", "c"]);
        assert!(store.lrange("bars", 5, 10).await.unwrap().is_empty());
        assert!(store.lrange("bars", 2, 1).await.unwrap().is_empty());
        assert!(store.lrange("bars", 0, -4).await.unwrap().is_empty());
        assert!(store.lrange("missing", 0, -1).await.unwrap().is_empty());
    }

    #[test]
    fn test_resolve_range_empty_list() {
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(1, 0, -1), Some((0, 1)));
    }
}
