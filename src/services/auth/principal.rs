use uuid::Uuid;

use crate::repos::user_repo::{Identity, Role};

pub const ADMIN_AUTHORITY: &str = "ROLE_ADMIN";

/// The minimal "who is asking" value carried by a request's auth context.
///
/// Built from a resolved [`Identity`] but carries none of its storage fields
/// (no hash, no email). Authorities are `ROLE_<role>` and are what access
/// decisions read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub user_id: Uuid,
    pub username: String,
    pub authorities: Vec<String>,
}

impl AuthenticatedPrincipal {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            authorities: vec![format!("ROLE_{}", role.as_str())],
        }
    }

    pub fn from_identity(identity: &Identity) -> Self {
        Self::new(identity.id, identity.username.clone(), identity.role)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn is_admin(&self) -> bool {
        self.has_authority(ADMIN_AUTHORITY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn authorities_follow_role() {
        let mut identity = Identity {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            email: "alice@x.com".to_string(),
            role: Role::User,
            enabled: true,
            created_at: Utc::now(),
        };

        let user = AuthenticatedPrincipal::from_identity(&identity);
        assert_eq!(user.user_id, identity.id);
        assert_eq!(user.authorities, vec!["ROLE_USER".to_string()]);
        assert!(!user.is_admin());

        identity.role = Role::Admin;
        let admin = AuthenticatedPrincipal::from_identity(&identity);
        assert_eq!(admin.authorities, vec![ADMIN_AUTHORITY.to_string()]);
        assert!(admin.is_admin());
    }
}
