//! Bar Ingest - HTTP ingestion of OHLCV bars into a Redis list
//!
//! This crate provides:
//!
//! - Bar data model and request validation (`bar`)
//! - List store abstraction with Redis and in-memory backends (`database`)
//! - `BarRepository`, which appends bar records to the `"bars"` list and reads
//!   ranges of it back
//! - The HTTP API (`api`): `POST /api/v1/bars`, `GET /health`, `GET /docs`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bar_ingest::{api, BarRepository, BarSchema, MemoryListStore};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let repository = BarRepository::with_default_key(Arc::new(MemoryListStore::new()));
//!     let state = api::AppState::new(repository, BarSchema::new(), "bars-backend");
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, api::router(state)).await
//! }
//! ```

pub mod api;
pub mod bar;
pub mod database;
pub mod error;
pub mod logger;
pub mod setting;

// Re-export commonly used types
pub use api::{router, AppState};
pub use bar::{Bar, BarBatch, BarRecord, BarSchema, FieldError};
pub use database::{BarRepository, ListStore, MemoryListStore, RedisConfig, RedisListStore};
pub use error::{AppError, SettingError, StoreError};
pub use setting::{SettingValue, Settings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
