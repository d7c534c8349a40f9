use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Does not touch the store.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
