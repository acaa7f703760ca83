/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - repo / auth / contact / id codec のエラーを統一的に変換
 * - token の失敗理由や identity の有無は body に出さない (すべて 401)
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;
use crate::services::contacts::ContactError;
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "invalid username or password".into(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "forbidden".into()),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut res = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(field) => AppError::conflict("CONFLICT", format!("{field} already exists")),
            other => {
                error!(error = ?other, "repository failure");
                AppError::Internal
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateUsername => {
                AppError::conflict("USERNAME_TAKEN", "username is already taken")
            }
            AuthError::DuplicateEmail => {
                AppError::conflict("EMAIL_TAKEN", "email is already registered")
            }
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Token(_) | AuthError::IdentityNotFound => AppError::Unauthorized,
            AuthError::InsufficientAuthority => AppError::Forbidden,
            AuthError::Hashing | AuthError::Signing | AuthError::Storage(_) => {
                error!(error = ?e, "auth service failure");
                AppError::Internal
            }
        }
    }
}

impl From<ContactError> for AppError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::NotFound => AppError::not_found("contact"),
            ContactError::DuplicateEmail => AppError::conflict(
                "CONTACT_EMAIL_TAKEN",
                "a contact with this email already exists",
            ),
            ContactError::Repo(inner) => {
                error!(error = ?inner, "contact storage failure");
                AppError::Internal
            }
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /contacts/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }
            // Server-side config / programming errors
            other => {
                error!(error = %other, "id codec failure");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::error::TokenError;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn token_failures_share_one_response() {
        let expired = AppError::from(AuthError::Token(TokenError::Expired)).into_response();
        let forged = AppError::from(AuthError::Token(TokenError::BadSignature)).into_response();
        let gone = AppError::from(AuthError::IdentityNotFound).into_response();

        for res in [&expired, &forged, &gone] {
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
        }

        let a = body_json(expired).await;
        let b = body_json(forged).await;
        let c = body_json(gone).await;
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (AppError::from(AuthError::DuplicateUsername), StatusCode::CONFLICT),
            (AppError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (AppError::from(AuthError::InsufficientAuthority), StatusCode::FORBIDDEN),
            (AppError::from(ContactError::NotFound), StatusCode::NOT_FOUND),
            (AppError::from(ContactError::DuplicateEmail), StatusCode::CONFLICT),
            (AppError::from(IdCodecError::DecodeInvalidFormat), StatusCode::BAD_REQUEST),
            (AppError::from(AuthError::Hashing), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn body_shape() {
        let res = AppError::bad_request("VALIDATION_ERROR", "email is invalid").into_response();
        let json = body_json(res).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "email is invalid");
    }
}
