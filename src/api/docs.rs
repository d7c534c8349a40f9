//! API documentation: an OpenAPI 3 document and a Swagger UI page for it.

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::{json, Map, Value};

use super::AppState;
use crate::bar::{FrameType, ImbalanceDir, MarketType};

const SWAGGER_UI_VERSION: &str = "5";

/// `GET /docs`
pub async fn swagger_ui(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
<title>{title} - Swagger UI</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@{version}/swagger-ui.css">
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
<script>
window.ui = SwaggerUIBundle({{ url: "/openapi.json", dom_id: "#swagger-ui" }});
</script>
</body>
</html>
"##,
        title = state.title,
        version = SWAGGER_UI_VERSION,
    ))
}

/// `GET /openapi.json`
pub async fn openapi(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(&state))
}

fn openapi_document(state: &AppState) -> Value {
    json!({
        "openapi": "3.1.0",
        "info": { "title": &*state.title, "version": env!("CARGO_PKG_VERSION") },
        "paths": {
            "/api/v1/bars": { "post": post_bars_operation() },
            "/health": {
                "get": {
                    "summary": "Health check",
                    "responses": { "200": { "description": "Service is up" } }
                }
            }
        },
        "components": { "schemas": {
            "BarBatch": {
                "type": "object",
                "properties": { "items": { "type": "array", "items": { "$ref": "#/components/schemas/Bar" } } },
                "required": ["items"]
            },
            "Bar": bar_schema(state),
            "ValidationError": validation_error_schema(),
            "HTTPValidationError": {
                "type": "object",
                "properties": { "detail": { "type": "array", "items": { "$ref": "#/components/schemas/ValidationError" } } }
            }
        } }
    })
}

fn post_bars_operation() -> Value {
    let accepted = json!({
        "type": "object",
        "properties": { "accepted": { "type": "integer" } },
        "required": ["accepted"]
    });

    json!({
        "tags": ["bars"],
        "summary": "Accept a batch of bars and append each one to the store",
        "requestBody": {
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BarBatch" } } }
        },
        "responses": {
            "200": {
                "description": "Number of bars submitted",
                "content": { "application/json": { "schema": accepted } }
            },
            "422": {
                "description": "Validation Error",
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/HTTPValidationError" } } }
            }
        }
    })
}

fn bar_schema(state: &AppState) -> Value {
    let venues: Vec<&str> = state.schema.venues().collect();
    let providers: Vec<&str> = state.schema.providers().collect();

    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut field = |name: &str, schema: Value, is_required: bool| {
        properties.insert(name.to_string(), schema);
        if is_required {
            required.push(name.to_string());
        }
    };

    field("tf", json!({ "type": "string" }), true);
    field("frame_type", json!({ "type": "string", "enum": FrameType::ALL }), true);
    field("tf_s", json!({ "type": "integer", "exclusiveMinimum": 0 }), true);
    field("market_type", json!({ "type": "string", "enum": MarketType::ALL }), true);
    field("venue_id", json!({ "type": "string", "enum": venues }), true);
    field("venue_symbol", json!({ "type": "string" }), true);
    field("instrument_uid", json!({ "type": "string" }), true);
    field("provider", json!({ "type": "string", "enum": providers }), true);
    for name in ["window_start_ms", "window_end_ms"] {
        field(name, json!({ "type": "integer" }), true);
    }
    field("is_final", json!({ "type": "boolean" }), true);
    for name in ["open", "high", "low", "close", "volume"] {
        field(name, json!({ "type": "number" }), true);
    }
    field("ts_emit_ms", json!({ "type": "integer" }), true);
    field("quality", json!({ "anyOf": [{ "type": "object" }, { "type": "null" }] }), false);
    field(
        "imbalance_dir",
        json!({ "anyOf": [{ "type": "string", "enum": ImbalanceDir::ALL }, { "type": "null" }] }),
        false,
    );

    json!({ "type": "object", "properties": properties, "required": required })
}

fn validation_error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "loc": { "type": "array", "items": { "anyOf": [{ "type": "string" }, { "type": "integer" }] } },
            "msg": { "type": "string" },
            "type": { "type": "string" }
        },
        "required": ["loc", "msg", "type"]
    })
}
