use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use crate::authz::engine;
use crate::authz::registry::Registry;
use crate::authz::types::CheckRequest;

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/v1/check", post(handle_check))
        .route("/healthz", get(health))
        .with_state(registry)
}

async fn handle_check(
    State(registry): State<Arc<Registry>>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    let context = match req.context {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    match engine::check(&registry, &req.role, &req.action, &req.resource, &context) {
        Ok(decision) => Json(decision).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
