//! HTTP API.
//!
//! Routes:
//!
//! - `POST /api/v1/bars`: ingest a batch of bars
//! - `GET /health`: liveness
//! - `GET /docs`, `GET /openapi.json`: API documentation

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::bar::{BarSchema, FieldError};
use crate::database::BarRepository;
use crate::error::StoreError;

pub mod bars;
pub mod docs;
pub mod health;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub repository: BarRepository,
    pub schema: Arc<BarSchema>,
    /// Title shown in the API documentation
    pub title: Arc<str>,
}

impl AppState {
    pub fn new(repository: BarRepository, schema: BarSchema, title: impl Into<Arc<str>>) -> Self {
        Self {
            repository,
            schema: Arc::new(schema),
            title: title.into(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/bars", post(bars::post_bars))
        .route("/health", get(health::health_check))
        .route("/docs", get(docs::swagger_ui))
        .route("/openapi.json", get(docs::openapi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed ({} errors)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                warn!(
                    count = errors.len(),
                    first = %errors.first().map(FieldError::path).unwrap_or_default(),
                    "rejected bar batch"
                );
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": errors }))).into_response()
            }
            ApiError::Body(
                rejection @ (JsonRejection::JsonSyntaxError(_)
                | JsonRejection::JsonDataError(_)
                | JsonRejection::MissingJsonContentType(_)),
            ) => {
                warn!("rejected malformed body: {}", rejection.body_text());
                let kind = match rejection {
                    JsonRejection::MissingJsonContentType(_) => "model_attributes_type",
                    _ => "json_invalid",
                };
                let detail = json!([{
                    "loc": ["body"],
                    "msg": rejection.body_text(),
                    "type": kind,
                }]);
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Body(rejection) => {
                (rejection.status(), Json(json!({ "detail": rejection.body_text() }))).into_response()
            }
            ApiError::Store(e) => {
                error!("store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{memory_app, send_raw};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _, _) = memory_app();
        let (status, _) = send_raw(app, Method::GET, "/api/v1/ticks", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (app, _, _) = memory_app();
        let (status, _) = send_raw(app, Method::GET, "/api/v1/bars", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_body_without_json_content_type() {
        let (app, store, _) = memory_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/bars")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"items": []}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"][0]["loc"], serde_json::json!(["body"]));
        assert_eq!(body["detail"][0]["type"], "model_attributes_type");
        assert_eq!(store.len(crate::database::DEFAULT_BAR_KEY), 0);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (app, _, _) = memory_app();
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
