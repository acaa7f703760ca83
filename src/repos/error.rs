/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - unique 制約違反は Conflict(field) として区別する (登録の競合判定に使う)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict on {0}")]
    Conflict(&'static str),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Map Postgres unique violations (23505) to `Conflict`, naming the field
    /// through the constraint that fired.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            let field = match dbe.constraint() {
                Some("users_username_key") => "username",
                Some("users_email_key") => "email",
                Some("contacts_owner_email_key") => "email",
                _ => "unknown",
            };
            return RepoError::Conflict(field);
        }
        RepoError::Db(e)
    }
}
