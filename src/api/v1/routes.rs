/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /auth, /contacts, /admin を route
 * - 認証の要否は handler の extractor (AuthCtxExtractor) で宣言する
 *   (gate は全 route に一度だけ掛かり、公開パスは PUBLIC_PATH_PREFIXES で決まる)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    admin,
    auth::{check_email, check_username, login, logout, me, register},
    contacts::{
        contact_stats, create_contact, delete_all_contacts, delete_contact, get_contact,
        list_contacts, search_contacts, update_contact,
    },
    health::health,
};

/// Root-level liveness probe (`/health`), outside the versioned prefix.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/check-username", get(check_username))
        .route("/auth/check-email", get(check_email))
        .route("/auth/logout", post(logout))
        .route(
            "/contacts",
            get(list_contacts)
                .post(create_contact)
                .delete(delete_all_contacts),
        )
        .route("/contacts/search", get(search_contacts))
        .route("/contacts/stats", get(contact_stats))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/admin/users/{user_id}", get(admin::get_user))
}
