/*
 * Responsibility
 * - GET /health, /api/v1/health (疎通用, 公開パス)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
