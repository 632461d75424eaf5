pub mod claims;
pub mod context;
pub mod middleware;
pub mod password;
pub mod tokens;

pub use claims::Claims;
pub use context::AuthContext;
pub use middleware::{OptionalAuth, RequireAdmin, RequireAuth, RequireModerator};
pub use password::{hash_password, verify_password};
pub use tokens::{IssuedToken, TokenKeys};

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::domain::{NewUser, UserRole};
use crate::storage::Storage;

/// Create the configured admin account unless a user with that name exists.
pub async fn seed_admin(storage: &dyn Storage, settings: &Settings) -> Result<()> {
    let existing = storage
        .get_user_by_username(&settings.admin_username)
        .await
        .context("Failed to look up admin account")?;

    if let Some(user) = existing {
        if !user.role.is_admin() {
            tracing::warn!(
                username = %user.username,
                role = %user.role,
                "ADMIN_USERNAME belongs to a non-admin account"
            );
        }
        return Ok(());
    }

    let admin = storage
        .create_user(NewUser {
            username: settings.admin_username.clone(),
            email: settings.admin_email.clone(),
            full_name: "Administrator".to_string(),
            phone: None,
            role: UserRole::Admin,
            password_hash: hash_password(&settings.admin_password)?,
        })
        .await
        .context("Failed to create admin account")?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Seeded admin account");
    Ok(())
}
