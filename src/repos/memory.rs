/*
 * Responsibility
 * - DATABASE_URL 無しの開発起動とテスト用の in-memory 実装
 * - ロックは await を跨がない (クリティカルセクションは同期処理のみ)
 */
use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::contact_repo::{
    Contact, ContactDraft, ContactFilter, ContactStore, Page, PageRequest, SortDirection, SortField,
};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{Identity, NewIdentity, UserStore};

fn poisoned() -> RepoError {
    RepoError::Corrupt("in-memory store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: RwLock<Vec<Identity>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Administrative toggle; identities are never deleted.
    #[cfg(test)]
    pub fn set_enabled(&self, username: &str, enabled: bool) {
        let mut users = self.users.write().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.username == username) {
            u.enabled = enabled;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserRepo {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<Identity>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> RepoResult<bool> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, new: NewIdentity) -> RepoResult<Identity> {
        // Check and insert under one write guard.
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.iter().any(|u| u.username == new.username) {
            return Err(RepoError::Conflict("username"));
        }
        if users.iter().any(|u| u.email == new.email) {
            return Err(RepoError::Conflict("email"));
        }

        let identity = new.into_identity();
        users.push(identity.clone());
        Ok(identity)
    }
}

#[derive(Debug, Default)]
struct ContactTable {
    next_id: i64,
    rows: BTreeMap<i64, Contact>,
}

#[derive(Debug, Default)]
pub struct MemoryContactRepo {
    table: RwLock<ContactTable>,
}

impl MemoryContactRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_conflict(table: &ContactTable, owner_id: Uuid, email: &str, except_id: Option<i64>) -> bool {
    table
        .rows
        .values()
        .any(|c| c.owner_id == owner_id && c.email == email && Some(c.id) != except_id)
}

fn compare(a: &Contact, b: &Contact, sort: SortField) -> std::cmp::Ordering {
    match sort {
        SortField::Id => a.id.cmp(&b.id),
        SortField::FirstName => a.first_name.cmp(&b.first_name),
        SortField::LastName => a.last_name.cmp(&b.last_name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl ContactStore for MemoryContactRepo {
    async fn insert(&self, owner_id: Uuid, draft: ContactDraft) -> RepoResult<Contact> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        if email_conflict(&table, owner_id, &draft.email, None) {
            return Err(RepoError::Conflict("email"));
        }

        table.next_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: table.next_id,
            owner_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone_number: draft.phone_number,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn find(&self, owner_id: Uuid, id: i64) -> RepoResult<Option<Contact>> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).filter(|c| c.owner_id == owner_id).cloned())
    }

    async fn update(&self, owner_id: Uuid, id: i64, draft: ContactDraft) -> RepoResult<Option<Contact>> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        if !table.rows.get(&id).is_some_and(|c| c.owner_id == owner_id) {
            return Ok(None);
        }
        if email_conflict(&table, owner_id, &draft.email, Some(id)) {
            return Err(RepoError::Conflict("email"));
        }

        let Some(contact) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        contact.first_name = draft.first_name;
        contact.last_name = draft.last_name;
        contact.email = draft.email;
        contact.phone_number = draft.phone_number;
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> RepoResult<bool> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        if table.rows.get(&id).is_some_and(|c| c.owner_id == owner_id) {
            table.rows.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn search(
        &self,
        owner_id: Uuid,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> RepoResult<Page<Contact>> {
        let table = self.table.read().map_err(|_| poisoned())?;
        let mut matched: Vec<Contact> = table
            .rows
            .values()
            .filter(|c| c.owner_id == owner_id && filter.matches(c))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ord = compare(a, b, page.sort);
            let ord = match page.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page {
            items,
            page: page.page,
            size: page.size,
            total,
        })
    }

    async fn count(&self, owner_id: Uuid) -> RepoResult<u64> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.values().filter(|c| c.owner_id == owner_id).count() as u64)
    }

    async fn delete_all(&self, owner_id: Uuid) -> RepoResult<u64> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        let before = table.rows.len();
        table.rows.retain(|_, c| c.owner_id != owner_id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn email_taken(&self, owner_id: Uuid, email: &str, except_id: Option<i64>) -> RepoResult<bool> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(email_conflict(&table, owner_id, email, except_id))
    }
}
