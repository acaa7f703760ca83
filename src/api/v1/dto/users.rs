/*
 * Responsibility
 * - identity の公開用 DTO (UserInfo)
 * - password hash はここに載せない
 */
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::repos::user_repo::Identity;

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: &'static str,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: identity.role.as_str(),
            enabled: identity.enabled,
            created_at: identity.created_at,
        }
    }
}
