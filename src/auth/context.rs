use uuid::Uuid;

use crate::domain::{User, UserRole};

/// Authenticated caller, resolved from the bearer token and the stored account
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID (from the `sub` claim)
    pub user_id: Uuid,

    pub username: String,

    /// Current stored role, not the one baked into the token
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }

    pub fn can_moderate(&self) -> bool {
        self.role.can_moderate()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The caller owns the record or may moderate it.
    pub fn can_manage(&self, owner_id: Option<Uuid>) -> bool {
        self.can_moderate() || owner_id == Some(self.user_id)
    }
}
