/*
 * Responsibility
 * - request/response DTO (JSON の形) と形式チェック
 */
use serde::Serialize;

pub mod auth;
pub mod contacts;
pub mod users;
mod validation;

/// Plain acknowledgement for operations that return no resource.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
