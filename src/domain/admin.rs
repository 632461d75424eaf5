//! Admin domain types
//!
//! Types for the moderation back-office: audit logging, statistics and backups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    Announcement, Job, ListingKind, Product, Service, UserResponse, UserRole,
};
use crate::validation::{Validate, ValidationErrors};

/// Admin action types for audit logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ApproveListing,
    RejectListing,
    DeleteListing,
    CreateUser,
    DeleteUser,
    ChangeUserRole,
    ActivateUser,
    DeactivateUser,
    ExportBackup,
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_string(self).unwrap_or_default();
        write!(f, "{}", s.trim_matches('"'))
    }
}

/// Target types for audit logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditTargetType {
    Product,
    Service,
    Job,
    Announcement,
    User,
    System,
}

impl From<ListingKind> for AuditTargetType {
    fn from(kind: ListingKind) -> Self {
        match kind {
            ListingKind::Products => Self::Product,
            ListingKind::Services => Self::Service,
            ListingKind::Jobs => Self::Job,
            ListingKind::Announcements => Self::Announcement,
        }
    }
}

impl std::fmt::Display for AuditTargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_string(self).unwrap_or_default();
        write!(f, "{}", s.trim_matches('"'))
    }
}

/// Admin audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_username: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_id: Option<Uuid>,
    pub actor_username: String,
    pub action: AdminAction,
    pub target_type: AuditTargetType,
    pub target_id: Option<Uuid>,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCounts {
    pub total: u64,
    pub admins: u64,
    pub moderators: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Admin dashboard stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboardStats {
    pub products: ListingCounts,
    pub services: ListingCounts,
    pub jobs: ListingCounts,
    pub announcements: ListingCounts,
    pub users: UserCounts,
    pub pending_total: u64,
    pub generated_at: DateTime<Utc>,
}

/// Pending listings of every kind, first page each
#[derive(Debug, Clone, Serialize)]
pub struct PendingQueue {
    pub products: Vec<Product>,
    pub services: Vec<Service>,
    pub jobs: Vec<Job>,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusRequest {
    pub is_active: bool,
}

// Both bodies are fully checked by deserialization.
impl Validate for ChangeRoleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Validate for ChangeStatusRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModerationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Per-entity row counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityCounts {
    pub users: u64,
    pub products: u64,
    pub services: u64,
    pub jobs: u64,
    pub announcements: u64,
    pub audit_entries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub backend: String,
    pub generated_at: DateTime<Utc>,
    pub counts: EntityCounts,
    pub format_version: u32,
}

/// Full export; password hashes are never included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<UserResponse>,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
    pub jobs: Vec<Job>,
    pub announcements: Vec<Announcement>,
    pub audit_log: Vec<AuditEntry>,
}

impl Snapshot {
    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            users: self.users.len() as u64,
            products: self.products.len() as u64,
            services: self.services.len() as u64,
            jobs: self.jobs.len() as u64,
            announcements: self.announcements.len() as u64,
            audit_entries: self.audit_log.len() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupExport {
    pub metadata: BackupMetadata,
    pub data: Snapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_and_target_display_as_snake_case() {
        assert_eq!(AdminAction::ChangeUserRole.to_string(), "change_user_role");
        assert_eq!(
            AuditTargetType::from(ListingKind::Announcements).to_string(),
            "announcement"
        );
    }
}
