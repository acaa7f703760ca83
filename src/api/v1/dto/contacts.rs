/*
 * Responsibility
 * - /contacts 系の request/response DTO
 * - 内部 ID (i64) は外に出さず、公開 ID (sqids) に変換して返す
 * - owner はレスポンスに含めない (常に呼び出し元本人)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{is_email, is_phone};
use crate::repos::contact_repo::{
    Contact, ContactDraft, ContactFilter, Page, PageRequest, SortDirection, SortField,
};
use crate::services::id_codec::{self, IdCodec};

const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let first = self.first_name.trim();
        if first.is_empty() {
            return Err("first_name is required");
        }
        if first.chars().count() > NAME_MAX {
            return Err("first_name must be <= 50 chars");
        }
        let last = self.last_name.trim();
        if last.is_empty() {
            return Err("last_name is required");
        }
        if last.chars().count() > NAME_MAX {
            return Err("last_name must be <= 50 chars");
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err("email is required");
        }
        if email.len() > EMAIL_MAX || !is_email(email) {
            return Err("email should be valid");
        }
        let phone = self.phone_number.trim();
        if phone.is_empty() {
            return Err("phone_number is required");
        }
        if !is_phone(phone) {
            return Err("phone_number should be valid");
        }
        Ok(())
    }

    pub fn into_draft(self) -> ContactDraft {
        ContactDraft {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactResponse {
    pub fn from_contact(contact: Contact, codec: &IdCodec) -> id_codec::Result<Self> {
        Ok(Self {
            id: codec.encode(contact.id)?,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone_number: contact.phone_number,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        })
    }
}

/// Query string for list and search. Search fields are ignored by the plain list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ContactQuery {
    pub fn page_request(&self) -> Result<PageRequest, &'static str> {
        let sort = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortField::default(),
            Some(s) => SortField::parse(s).ok_or("sort_by is not a sortable field")?,
        };
        let direction = match self.sort_direction.as_deref().map(str::trim) {
            None | Some("") => SortDirection::default(),
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(_) => return Err("sort_direction must be asc or desc"),
        };
        Ok(PageRequest::new(self.page, self.size, sort, direction))
    }

    pub fn filter(&self) -> ContactFilter {
        ContactFilter {
            first_name: non_blank(&self.first_name),
            last_name: non_blank(&self.last_name),
            email: non_blank(&self.email),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PagedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactStatsResponse {
    pub total_contacts: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            first_name: " Jane ".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone_number: "+1 555 010 0222".to_string(),
        }
    }

    #[test]
    fn validates_and_trims() {
        let req = request();
        assert!(req.validate().is_ok());
        assert_eq!(req.into_draft().first_name, "Jane");
    }

    #[test]
    fn rejects_bad_fields() {
        let mut r = request();
        r.first_name = "   ".to_string();
        assert!(r.validate().is_err());

        let mut r = request();
        r.last_name = "x".repeat(51);
        assert!(r.validate().is_err());

        let mut r = request();
        r.email = "jane".to_string();
        assert!(r.validate().is_err());

        let mut r = request();
        r.phone_number = "12345".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn query_to_page_request() {
        let q = ContactQuery {
            size: Some(500),
            sort_by: Some("last_name".to_string()),
            sort_direction: Some("DESC".to_string()),
            ..Default::default()
        };
        let p = q.page_request().unwrap();
        assert_eq!(p.size, PageRequest::MAX_SIZE);
        assert_eq!(p.sort, SortField::LastName);
        assert_eq!(p.direction, SortDirection::Desc);

        let bad = ContactQuery {
            sort_by: Some("password_hash".to_string()),
            ..Default::default()
        };
        assert!(bad.page_request().is_err());
    }

    #[test]
    fn blank_search_terms_are_dropped() {
        let q = ContactQuery {
            first_name: Some("  ".to_string()),
            email: Some(" x.com ".to_string()),
            ..Default::default()
        };
        let f = q.filter();
        assert_eq!(f.first_name, None);
        assert_eq!(f.email.as_deref(), Some("x.com"));
    }
}
