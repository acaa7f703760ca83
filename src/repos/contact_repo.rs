/*
 * Responsibility
 * - contacts の保存先インターフェース ContactStore と Postgres 実装
 * - 全メソッドが owner_id を必須で受け取り、必ず owner_id で絞り込む
 *   (他人の contact は「存在しない」のと区別できない)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct Contact {
    pub id: i64,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a contact (create and full update).
#[derive(Debug, Clone)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

/// Case-insensitive "contains" filters, AND-ed together. `None` means no filter.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle {
                Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
                None => true,
            }
        }

        contains(&contact.first_name, &self.first_name)
            && contains(&contact.last_name, &self.last_name)
            && contains(&contact.email, &self.email)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "first_name" | "firstName" => Some(Self::FirstName),
            "last_name" | "lastName" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "created_at" | "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    // Column names come from this closed set only; never from request input.
    fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 100;

    /// Clamp raw paging input: page >= 0, size in 1..=100.
    pub fn new(page: Option<i64>, size: Option<i64>, sort: SortField, direction: SortDirection) -> Self {
        let page = page.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        let size = size
            .unwrap_or(Self::DEFAULT_SIZE as i64)
            .clamp(1, Self::MAX_SIZE as i64) as u32;
        Self {
            page,
            size,
            sort,
            direction,
        }
    }

    pub fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, SortField::default(), SortDirection::default())
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.size.max(1) as u64)
    }
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, owner_id: Uuid, draft: ContactDraft) -> RepoResult<Contact>;
    async fn find(&self, owner_id: Uuid, id: i64) -> RepoResult<Option<Contact>>;
    async fn update(&self, owner_id: Uuid, id: i64, draft: ContactDraft) -> RepoResult<Option<Contact>>;
    async fn delete(&self, owner_id: Uuid, id: i64) -> RepoResult<bool>;
    async fn search(
        &self,
        owner_id: Uuid,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>>;
    async fn count(&self, owner_id: Uuid) -> RepoResult<u64>;
    async fn delete_all(&self, owner_id: Uuid) -> RepoResult<u64>;
    async fn email_taken(&self, owner_id: Uuid, email: &str, except_id: Option<i64>) -> RepoResult<bool>;
}

const CONTACT_COLUMNS: &str =
    "id, owner_id, first_name, last_name, email, phone_number, created_at, updated_at";

// Escape LIKE metacharacters so user input is matched literally.
fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, owner_id: Uuid, filter: &ContactFilter) {
    qb.push(" WHERE owner_id = ").push_bind(owner_id);
    for (column, needle) in [
        ("first_name", &filter.first_name),
        ("last_name", &filter.last_name),
        ("email", &filter.email),
    ] {
        if let Some(needle) = needle {
            qb.push(format!(" AND {column} ILIKE "))
                .push_bind(like_pattern(needle))
                .push(" ESCAPE '\\'");
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgContactRepo {
    pool: PgPool,
}

impl PgContactRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactRepo {
    async fn insert(&self, owner_id: Uuid, draft: ContactDraft) -> RepoResult<Contact> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (owner_id, first_name, last_name, email, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn find(&self, owner_id: Uuid, id: i64) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, owner_id: Uuid, id: i64, draft: ContactDraft) -> RepoResult<Option<Contact>> {
        let row = sqlx::query_as::<_, Contact>(&format!(
            r#"
            UPDATE contacts
            SET
                first_name = $3,
                last_name = $4,
                email = $5,
                phone_number = $6,
                updated_at = now()
            WHERE id = $1 AND owner_id = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&draft.first_name)
        .bind(&draft.last_name)
        .bind(&draft.email)
        .bind(&draft.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        owner_id: Uuid,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts");
        push_filter(&mut count_qb, owner_id, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_filter(&mut qb, owner_id, filter);
        qb.push(format!(
            " ORDER BY {} {}, id ASC LIMIT ",
            page.sort.column(),
            page.direction.sql()
        ))
        .push_bind(page.size as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());

        let items = qb
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            page: page.page,
            size: page.size,
            total: total.max(0) as u64,
        })
    }

    async fn count(&self, owner_id: Uuid) -> RepoResult<u64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total.max(0) as u64)
    }

    async fn delete_all(&self, owner_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM contacts WHERE owner_id = $1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn email_taken(&self, owner_id: Uuid, email: &str, except_id: Option<i64>) -> RepoResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM contacts
                WHERE owner_id = $1
                    AND email = $2
                    AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(email)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn page_request_clamps_input() {
        let p = PageRequest::new(Some(-3), Some(1000), SortField::Id, SortDirection::Asc);
        assert_eq!(p.page, 0);
        assert_eq!(p.size, PageRequest::MAX_SIZE);

        let p = PageRequest::new(Some(2), Some(0), SortField::Email, SortDirection::Desc);
        assert_eq!(p.size, 1);
        assert_eq!(p.offset(), 2);

        let p = PageRequest::default();
        assert_eq!(p.size, PageRequest::DEFAULT_SIZE);
    }

    #[test]
    fn sort_field_rejects_unknown_columns() {
        assert_eq!(SortField::parse("lastName"), Some(SortField::LastName));
        assert_eq!(SortField::parse("id; DROP TABLE contacts"), None);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<()> = Page {
            items: vec![],
            page: 0,
            size: 20,
            total: 41,
        };
        assert_eq!(page.total_pages(), 3);
    }
}
