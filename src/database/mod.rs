//! Persistence for bar records.
//!
//! - **ListStore**: the two list commands the service needs (`RPUSH`, `LRANGE`)
//! - **RedisListStore**: Redis backend
//! - **MemoryListStore**: in-process backend for tests and local runs
//! - **BarRepository**: encodes bar records to text and back over a list store

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AppError, StoreError};
use crate::setting::Settings;

pub mod memory;
pub mod redis_store;
pub mod repository;

pub use memory::MemoryListStore;
pub use redis_store::{RedisConfig, RedisListStore};
pub use repository::{BarRepository, DEFAULT_BAR_KEY};

/// Append-only list store.
///
/// Indices follow Redis `LRANGE`: both ends inclusive, negative values count
/// from the tail (`-1` is the last element).
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append a value to the tail of the list at `key`
    async fn rpush(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Fetch the inclusive range `[start, end]` of the list at `key`
    async fn lrange(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>, StoreError>;
}

/// Build the store named by `database.name`.
pub async fn connect_store(settings: &Settings) -> Result<Arc<dyn ListStore>, AppError> {
    let name = settings.get_string("database.name").unwrap_or_else(|| "redis".to_string());
    match name.as_str() {
        "redis" => {
            let config = RedisConfig::from_settings(settings)?;
            Ok(Arc::new(RedisListStore::connect(&config).await?))
        }
        "memory" => Ok(Arc::new(MemoryListStore::new())),
        other => Err(AppError::Config {
            key: "database.name".to_string(),
            reason: format!("unknown store {other:?}, expected \"redis\" or \"memory\""),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::SettingValue;

    #[tokio::test]
    async fn test_connect_memory_store() {
        let settings = Settings::new();
        settings.set("database.name", SettingValue::String("memory".to_string()));

        let store = connect_store(&settings).await.unwrap();
        store.rpush("k", "v".to_string()).await.unwrap();
        assert_eq!(store.lrange("k", 0, -1).await.unwrap(), vec!["v"]);
    }

    #[tokio::test]
    async fn test_connect_unknown_store() {
        let settings = Settings::new();
        settings.set("database.name", SettingValue::String("sqlite".to_string()));

        let err = connect_store(&settings).await.err().unwrap();
        assert!(matches!(err, AppError::Config { ref key, .. } if key == "database.name"));
    }
}
