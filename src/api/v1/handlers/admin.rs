/*
 * Responsibility
 * - 管理者向け handler (GET /admin/users/{user_id})
 * - 権限判定は policy::authorize で明示的に行う (ROLE_ADMIN 以外は 403)
 */
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    api::v1::{dto::users::UserInfo, extractors::AuthCtxExtractor},
    error::AppError,
    services::auth::{
        AuthError,
        policy::{Action, Resource, authorize},
    },
    state::AppState,
};

pub async fn get_user(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user_id): Path<String>,
) -> Result<Json<UserInfo>, AppError> {
    if !authorize(&ctx.principal, Action::Read, Resource::AnyAccount) {
        tracing::warn!(user_id = %ctx.user_id(), "admin endpoint denied");
        return Err(AuthError::InsufficientAuthority.into());
    }

    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| AppError::bad_request("INVALID_USER_ID", "user id must be a UUID"))?;

    let identity = state
        .auth
        .identity_by_id(user_id)
        .await
        .map_err(|e| match e {
            AuthError::IdentityNotFound => AppError::not_found("user"),
            other => other.into(),
        })?;

    Ok(Json(UserInfo::from(&identity)))
}
