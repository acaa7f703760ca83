/*
 * Responsibility
 * - contact の業務ロジック (作成 / 取得 / 更新 / 削除 / 検索 / 集計)
 * - 所有者は常に認証済み principal から取る (パスやボディの値は使わない)
 * - 他人の contact は「存在しない」と同じ扱い (NotFound で統一)
 */
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::repos::contact_repo::{Contact, ContactDraft, ContactFilter, ContactStore, Page, PageRequest};
use crate::repos::error::RepoError;
use crate::services::auth::policy::{Action, Resource, authorize};
use crate::services::auth::principal::AuthenticatedPrincipal;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact not found")]
    NotFound,
    #[error("a contact with this email already exists")]
    DuplicateEmail,
    #[error("contact storage failure")]
    Repo(#[source] RepoError),
}

impl From<RepoError> for ContactError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict("email") => ContactError::DuplicateEmail,
            other => ContactError::Repo(other),
        }
    }
}

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl std::fmt::Debug for ContactService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactService").finish_non_exhaustive()
    }
}

// A row that slipped past the store's owner filter is still hidden.
fn visible(who: &AuthenticatedPrincipal, action: Action, contact: Contact) -> Result<Contact, ContactError> {
    if authorize(who, action, Resource::Contact { owner_id: contact.owner_id }) {
        Ok(contact)
    } else {
        warn!(user_id = %who.user_id, contact_id = contact.id, "contact owner mismatch");
        Err(ContactError::NotFound)
    }
}

// Every call works on the caller's own book; the owner never comes from input.
fn own_book(who: &AuthenticatedPrincipal, action: Action) -> Result<uuid::Uuid, ContactError> {
    let owner_id = who.user_id;
    if authorize(who, action, Resource::ContactBook { owner_id }) {
        Ok(owner_id)
    } else {
        Err(ContactError::NotFound)
    }
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, who: &AuthenticatedPrincipal, draft: ContactDraft) -> Result<Contact, ContactError> {
        let owner_id = own_book(who, Action::Create)?;
        if self.store.email_taken(owner_id, &draft.email, None).await? {
            return Err(ContactError::DuplicateEmail);
        }
        let contact = self.store.insert(owner_id, draft).await?;
        info!(user_id = %who.user_id, contact_id = contact.id, "contact created");
        Ok(contact)
    }

    pub async fn get(&self, who: &AuthenticatedPrincipal, id: i64) -> Result<Contact, ContactError> {
        let contact = self
            .store
            .find(who.user_id, id)
            .await?
            .ok_or(ContactError::NotFound)?;
        visible(who, Action::Read, contact)
    }

    pub async fn update(
        &self,
        who: &AuthenticatedPrincipal,
        id: i64,
        draft: ContactDraft,
    ) -> Result<Contact, ContactError> {
        // Existence first so a foreign id reads as NotFound, never as a conflict.
        self.get(who, id).await?;
        if self.store.email_taken(who.user_id, &draft.email, Some(id)).await? {
            return Err(ContactError::DuplicateEmail);
        }

        let contact = self
            .store
            .update(who.user_id, id, draft)
            .await?
            .ok_or(ContactError::NotFound)?;
        info!(user_id = %who.user_id, contact_id = id, "contact updated");
        visible(who, Action::Update, contact)
    }

    pub async fn delete(&self, who: &AuthenticatedPrincipal, id: i64) -> Result<(), ContactError> {
        let contact = self
            .store
            .find(who.user_id, id)
            .await?
            .ok_or(ContactError::NotFound)?;
        let contact = visible(who, Action::Delete, contact)?;
        if !self.store.delete(who.user_id, contact.id).await? {
            return Err(ContactError::NotFound);
        }
        info!(user_id = %who.user_id, contact_id = id, "contact deleted");
        Ok(())
    }

    pub async fn search(
        &self,
        who: &AuthenticatedPrincipal,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> Result<Page<Contact>, ContactError> {
        let owner_id = own_book(who, Action::List)?;
        let found = self.store.search(owner_id, filter, page).await?;
        if found
            .items
            .iter()
            .any(|c| !authorize(who, Action::List, Resource::ContactBook { owner_id: c.owner_id }))
        {
            warn!(user_id = %who.user_id, "search returned rows of another owner");
            return Err(ContactError::Repo(RepoError::Corrupt(
                "owner filter violated".to_string(),
            )));
        }
        Ok(found)
    }

    pub async fn count(&self, who: &AuthenticatedPrincipal) -> Result<u64, ContactError> {
        let owner_id = own_book(who, Action::List)?;
        Ok(self.store.count(owner_id).await?)
    }

    pub async fn delete_all(&self, who: &AuthenticatedPrincipal) -> Result<u64, ContactError> {
        let owner_id = own_book(who, Action::Delete)?;
        let removed = self.store.delete_all(owner_id).await?;
        info!(user_id = %who.user_id, removed, "all contacts deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::repos::memory::MemoryContactRepo;
    use crate::repos::user_repo::Role;

    fn principal() -> AuthenticatedPrincipal {
        AuthenticatedPrincipal::new(Uuid::new_v4(), "p", Role::User)
    }

    fn draft(email: &str) -> ContactDraft {
        ContactDraft {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            phone_number: "+1 555 0100 22".to_string(),
        }
    }

    #[tokio::test]
    async fn foreign_contact_is_indistinguishable_from_missing() {
        let service = ContactService::new(Arc::new(MemoryContactRepo::new()));
        let a = principal();
        let b = principal();

        let owned = service.create(&a, draft("jane@x.com")).await.unwrap();

        let foreign = service.get(&b, owned.id).await.unwrap_err();
        let missing = service.get(&b, owned.id + 1000).await.unwrap_err();
        assert!(matches!(foreign, ContactError::NotFound));
        assert_eq!(foreign.to_string(), missing.to_string());

        assert!(matches!(
            service.update(&b, owned.id, draft("x@x.com")).await,
            Err(ContactError::NotFound)
        ));
        assert!(matches!(service.delete(&b, owned.id).await, Err(ContactError::NotFound)));

        // Still intact for its owner.
        assert_eq!(service.get(&a, owned.id).await.unwrap().email, "jane@x.com");
    }

    #[tokio::test]
    async fn update_keeps_own_email_but_rejects_a_sibling_email() {
        let service = ContactService::new(Arc::new(MemoryContactRepo::new()));
        let a = principal();

        let first = service.create(&a, draft("one@x.com")).await.unwrap();
        service.create(&a, draft("two@x.com")).await.unwrap();

        assert!(service.update(&a, first.id, draft("one@x.com")).await.is_ok());
        assert!(matches!(
            service.update(&a, first.id, draft("two@x.com")).await,
            Err(ContactError::DuplicateEmail)
        ));
        assert!(matches!(
            service.create(&a, draft("two@x.com")).await,
            Err(ContactError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn counts_and_bulk_delete_are_per_owner() {
        let service = ContactService::new(Arc::new(MemoryContactRepo::new()));
        let a = principal();
        let b = principal();

        service.create(&a, draft("1@x.com")).await.unwrap();
        service.create(&a, draft("2@x.com")).await.unwrap();
        service.create(&b, draft("1@x.com")).await.unwrap();

        assert_eq!(service.count(&a).await.unwrap(), 2);
        assert_eq!(service.delete_all(&a).await.unwrap(), 2);
        assert_eq!(service.count(&a).await.unwrap(), 0);
        assert_eq!(service.count(&b).await.unwrap(), 1);

        let page = service
            .search(&b, &ContactFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }
}
