/*
 * Responsibility
 * - identity (users テーブル) の保存先インターフェース UserStore
 * - Postgres 実装 PgUserRepo
 * - insert は username/email の一意性を原子的に保証する (Conflict を返す)
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(RepoError::Corrupt(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered identity.
///
/// `password_hash` is an encoded Argon2 PHC string and is never printed.
#[derive(Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Insert payload. The id and timestamp are assigned by the caller so that
/// every backend produces the same record shape.
#[derive(Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
}

impl NewIdentity {
    pub fn into_identity(self) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: self.username,
            password_hash: self.password_hash,
            email: self.email,
            role: self.role,
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

/// Identity storage as seen by the auth core.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Identity>>;
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>>;
    async fn exists_by_username(&self, username: &str) -> RepoResult<bool>;
    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;

    // Must fail with `RepoError::Conflict("username" | "email")` when either value
    // is already taken, even under concurrent inserts.
    async fn insert(&self, new: NewIdentity) -> RepoResult<Identity>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    email: String,
    role: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Identity {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            email: row.email,
            role: row.role.parse()?,
            enabled: row.enabled,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepo {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, email, role, enabled, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, email, role, enabled, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Identity::try_from).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert(&self, new: NewIdentity) -> RepoResult<Identity> {
        let identity = new.into_identity();

        // The unique constraints make this atomic; a concurrent duplicate surfaces as 23505.
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, email, role, enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, password_hash, email, role, enabled, created_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.password_hash)
        .bind(&identity.email)
        .bind(identity.role.as_str())
        .bind(identity.enabled)
        .bind(identity.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Identity::try_from(row)
    }
}
