//! Redis list store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::info;

use super::ListStore;
use crate::error::{AppError, StoreError};
use crate::setting::Settings;

/// Redis connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    /// Logical database index
    pub db: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

impl RedisConfig {
    /// Read `redis.host`, `redis.port` and `redis.db`.
    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let defaults = Self::default();
        let port = settings.get_int("redis.port").unwrap_or(defaults.port as i64);
        let port = u16::try_from(port).map_err(|_| AppError::Config {
            key: "redis.port".to_string(),
            reason: format!("{port} is not a valid port"),
        })?;
        let db = settings.get_int("redis.db").unwrap_or(defaults.db);
        if db < 0 {
            return Err(AppError::Config {
                key: "redis.db".to_string(),
                reason: format!("{db} is not a valid database index"),
            });
        }

        Ok(Self {
            host: settings.get_string("redis.host").unwrap_or(defaults.host),
            port,
            db,
        })
    }

    /// `redis://host:port/db`
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                ..Default::default()
            },
        }
    }
}

/// List store backed by Redis.
///
/// Holds one multiplexed connection; clones of it share the underlying socket,
/// so concurrent requests can issue commands without a pool.
#[derive(Clone)]
pub struct RedisListStore {
    connection: MultiplexedConnection,
}

impl RedisListStore {
    /// Open the connection. Fails if Redis is unreachable.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.connection_info())?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis at {}", config.url());
        Ok(Self { connection })
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn rpush(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.rpush(key, value).await?;
        Ok(())
    }

    async fn lrange(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();
        Ok(connection.lrange(key, start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::SettingValue;

    #[test]
    fn test_config_from_default_settings() {
        let config = RedisConfig::from_settings(&Settings::new()).unwrap();
        assert_eq!(config, RedisConfig::default());
        assert_eq!(config.url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_config_overrides() {
        let settings = Settings::new();
        settings.set("redis.host", SettingValue::String("cache.internal".to_string()));
        settings.set("redis.port", SettingValue::Int(6380));
        settings.set("redis.db", SettingValue::Int(3));

        let config = RedisConfig::from_settings(&settings).unwrap();
        assert_eq!(config.url(), "redis://cache.internal:6380/3");

        let info = config.connection_info();
        assert_eq!(info.redis.db, 3);
        assert!(matches!(info.addr, ConnectionAddr::Tcp(ref host, 6380) if host == "cache.internal"));
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let settings = Settings::new();
        settings.set("redis.port", SettingValue::Int(70000));
        assert!(RedisConfig::from_settings(&settings).is_err());

        let settings = Settings::new();
        settings.set("redis.db", SettingValue::Int(-1));
        assert!(RedisConfig::from_settings(&settings).is_err());
    }
}
