//! User accounts and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{apply_patch, blank_as_none, clearable, patch_value, trimmed, trimmed_opt, Patch};
use crate::validation::{Validate, ValidationErrors, Validator, MAX_NAME_LEN, MIN_PASSWORD_LEN};

/// Back-office role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Moderator,
    #[default]
    User,
}

impl UserRole {
    /// Admins and moderators may approve and reject listings.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Moderator => write!(f, "moderator"),
            Self::User => write!(f, "user"),
        }
    }
}

/// User entity as stored. Never serialized directly; see [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage input for a new account; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub password_hash: String,
}

/// Storage patch; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Patch<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        apply_patch(&mut user.phone, self.phone);
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.is_active {
            user.is_active = active;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.is_active.is_some_and(|active| active != user.is_active) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&user.username, &user.email, &user.full_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            phone: u.phone,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

fn check_username(v: &mut Validator, username: &str) {
    v.text("username", username, 3, 50);
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        v.error(
            "username",
            "may only contain letters, digits, '_', '.' and '-'",
        );
    }
}

fn check_password(v: &mut Validator, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        v.error(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    v.max_len("password", password, 128);
}

/// Self-service sign-up
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub username: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub email: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub full_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        check_username(&mut v, &self.username);
        v.email("email", &self.email)
            .text("full_name", &self.full_name, 2, MAX_NAME_LEN);
        if let Some(phone) = &self.phone {
            v.phone("phone", phone);
        }
        check_password(&mut v, &self.password);
        v.finish()
    }
}

/// Admin-created account, any role
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub account: RegisterRequest,
    #[serde(default)]
    pub role: UserRole,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.account.validate()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub phone: Patch<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Admin only
    #[serde(default)]
    pub role: Option<UserRole>,
    /// Admin only
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(email) = &self.email {
            v.email("email", email);
        }
        v.optional_text("full_name", self.full_name.as_deref(), 2, MAX_NAME_LEN);
        if let Some(phone) = patch_value(&self.phone) {
            v.phone("phone", phone);
        }
        if let Some(password) = &self.password {
            check_password(&mut v, password);
        }
        v.finish()
    }
}

impl UpdateUserRequest {
    pub fn touches_privileges(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("username", &self.username);
        v.required("password", &self.password);
        v.finish()
    }
}
