//! Error types.

use thiserror::Error;

/// Failure loading settings.
#[derive(Debug, Error)]
pub enum SettingError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value {value:?} for setting {key}")]
    InvalidValue { key: String, value: String },
    #[error("settings lock poisoned: {0}")]
    Poisoned(String),
}

/// Failure talking to the list store or decoding what it returned.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("stored entry {index} is not a valid record: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure starting or running the service.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Setting(#[from] SettingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("logger error: {0}")]
    Logger(String),
    #[error("invalid setting {key}: {reason}")]
    Config { key: String, reason: String },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
