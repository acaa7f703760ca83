/*
 * Responsibility
 * - /auth 系 handler (register / login / me / check-username / check-email / logout)
 * - Json/Query を extractor で受け、DTO validation → AuthService 呼び出し
 * - token は stateless。logout はサーバー側で何も消さない (client が token を捨てる)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::auth::{
            AvailabilityResponse, EmailQuery, LoginRequest, LoginResponse, RegisterRequest,
            UsernameQuery,
        },
        dto::MessageResponse,
        dto::users::UserInfo,
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::auth::{
        AuthError,
        policy::{Action, Resource, authorize},
    },
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    let identity = state
        .auth
        .register(req.username.trim(), &req.password, req.email.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(UserInfo::from(&identity))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    let (issued, identity) = state.auth.login(req.username.trim(), &req.password).await?;
    tracing::info!(user_id = %identity.id, exp = issued.claims.exp, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
        user: UserInfo::from(&identity),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserInfo>, AppError> {
    let account = Resource::Account { user_id: ctx.user_id() };
    if !authorize(&ctx.principal, Action::Read, account) {
        return Err(AuthError::InsufficientAuthority.into());
    }

    let identity = state.auth.identity_by_id(ctx.user_id()).await?;
    Ok(Json(UserInfo::from(&identity)))
}

pub async fn check_username(
    State(state): State<AppState>,
    Query(q): Query<UsernameQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let username = q.username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("VALIDATION_ERROR", "username is required"));
    }
    let available = state.auth.is_username_available(username).await?;
    Ok(Json(AvailabilityResponse { available }))
}

pub async fn check_email(
    State(state): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let email = q.email.trim();
    if email.is_empty() {
        return Err(AppError::bad_request("VALIDATION_ERROR", "email is required"));
    }
    let available = state.auth.is_email_available(email).await?;
    Ok(Json(AvailabilityResponse { available }))
}

pub async fn logout(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MessageResponse> {
    tracing::info!(user_id = %ctx.user_id(), "logout acknowledged");
    Json(MessageResponse {
        message: "logged out; discard the token on the client",
    })
}
