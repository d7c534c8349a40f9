//! Bar ingestion endpoint.

use axum::extract::{FromRequest, Request, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::{ApiError, AppState};
use crate::bar::BarBatch;
use crate::error::StoreError;

/// Response body of `POST /api/v1/bars`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    /// Number of items submitted in the batch
    pub accepted: usize,
}

/// Request body that passed schema validation as a whole.
#[derive(Debug)]
pub struct ValidatedBatch(pub BarBatch);

impl FromRequest<AppState> for ValidatedBatch {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;
        let batch = state.schema.parse_batch(body).map_err(ApiError::Validation)?;
        Ok(Self(batch))
    }
}

/// Append every bar of a validated batch, in order, one store call each.
///
/// A store failure stops the loop: earlier bars stay persisted, later ones are
/// never sent, and the client gets a 500.
pub async fn post_bars(
    State(state): State<AppState>,
    ValidatedBatch(batch): ValidatedBatch,
) -> Result<Json<Accepted>, ApiError> {
    let total = batch.len();

    for (index, bar) in batch.items.iter().enumerate() {
        let record = bar.to_record().map_err(StoreError::Serialize)?;
        if let Err(e) = state.repository.append(&record).await {
            error!(index, total, key = state.repository.key(), "bar append failed: {e}");
            return Err(e.into());
        }
    }

    info!(accepted = total, "bar batch accepted");
    Ok(Json(Accepted { accepted: total }))
}
