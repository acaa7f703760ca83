//! Access decisions, evaluated explicitly at the boundary.
//!
//! Ownership is compared against the principal's id from the verified token.
//! Ids taken from paths or bodies only ever appear here as the *resource* side.

use uuid::Uuid;

use crate::services::auth::principal::AuthenticatedPrincipal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A single stored contact.
    Contact { owner_id: Uuid },
    /// The contact collection belonging to `owner_id`.
    ContactBook { owner_id: Uuid },
    /// One identity's account record.
    Account { user_id: Uuid },
    /// Any identity's account record (administration).
    AnyAccount,
}

pub fn authorize(principal: &AuthenticatedPrincipal, action: Action, resource: Resource) -> bool {
    match resource {
        Resource::Contact { owner_id } | Resource::ContactBook { owner_id } => {
            owner_id == principal.user_id
        }
        Resource::Account { user_id } => match action {
            Action::Read => user_id == principal.user_id || principal.is_admin(),
            _ => principal.is_admin(),
        },
        Resource::AnyAccount => principal.is_admin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::user_repo::Role;
    use crate::services::auth::principal::ADMIN_AUTHORITY;

    fn principal(role: Role) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal::new(Uuid::new_v4(), "p", role)
    }

    #[test]
    fn contacts_are_owner_only() {
        let a = principal(Role::User);
        let b = principal(Role::User);
        let admin = principal(Role::Admin);
        let owned_by_a = Resource::Contact { owner_id: a.user_id };

        for action in [Action::Read, Action::Update, Action::Delete] {
            assert!(authorize(&a, action, owned_by_a));
            assert!(!authorize(&b, action, owned_by_a));
            // Admin role grants no access to other people's contacts.
            assert!(!authorize(&admin, action, owned_by_a));
        }
        assert!(authorize(&a, Action::List, Resource::ContactBook { owner_id: a.user_id }));
        assert!(!authorize(&b, Action::Create, Resource::ContactBook { owner_id: a.user_id }));
    }

    #[test]
    fn accounts() {
        let a = principal(Role::User);
        let b = principal(Role::User);
        let admin = principal(Role::Admin);

        assert!(authorize(&a, Action::Read, Resource::Account { user_id: a.user_id }));
        assert!(!authorize(&b, Action::Read, Resource::Account { user_id: a.user_id }));
        assert!(authorize(&admin, Action::Read, Resource::Account { user_id: a.user_id }));
        assert!(!authorize(&a, Action::Update, Resource::Account { user_id: a.user_id }));

        assert!(!authorize(&a, Action::Read, Resource::AnyAccount));
        assert!(authorize(&admin, Action::Read, Resource::AnyAccount));
    }

    #[test]
    fn admin_decisions_read_granted_authorities() {
        let mut p = principal(Role::User);
        assert!(!authorize(&p, Action::Read, Resource::AnyAccount));

        p.authorities.push(ADMIN_AUTHORITY.to_string());
        assert!(authorize(&p, Action::Read, Resource::AnyAccount));
        assert!(authorize(&p, Action::Delete, Resource::Account { user_id: Uuid::new_v4() }));
        // Still no reach into another owner's contacts.
        let other = Uuid::new_v4();
        assert!(!authorize(&p, Action::Create, Resource::ContactBook { owner_id: other }));
    }
}
