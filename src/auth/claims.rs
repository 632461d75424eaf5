use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// JWT claims issued at login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username at issue time
    pub username: String,

    /// Role at issue time. Authorization re-reads the stored role.
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}
