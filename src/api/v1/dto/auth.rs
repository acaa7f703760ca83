/*
 * Responsibility
 * - /auth 系の request/response DTO
 * - validate() で形式チェック (重複などの業務判定は service 側)
 * - password は Debug に出さない
 */
use std::fmt;

use serde::{Deserialize, Serialize};

use super::users::UserInfo;
use super::validation::{char_len_between, is_email};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if !char_len_between(&self.username, 3, 50) {
            return Err("username must be 3 to 50 characters");
        }
        if self.username.chars().any(char::is_whitespace) {
            return Err("username must not contain whitespace");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        if !char_len_between(&self.password, 6, 128) {
            return Err("password must be 6 to 128 characters");
        }
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        if self.email.len() > 100 || !is_email(self.email.trim()) {
            return Err("email should be valid");
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: u64,
    pub user: UserInfo,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}
