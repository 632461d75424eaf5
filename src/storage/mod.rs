//! Storage access layer
//!
//! One [`Storage`] trait with two interchangeable backends: [`PgStorage`]
//! over PostgreSQL and [`MemoryStorage`], a list-based fallback used when no
//! database is configured.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{Page, PaginationParams};
use crate::domain::admin::{AuditEntry, NewAuditEntry, Snapshot};
use crate::domain::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Create/read/update/delete per entity. Lists are ordered newest first.
#[async_trait]
pub trait Storage: Send + Sync {
    fn backend(&self) -> StorageBackend;

    async fn health_check(&self) -> bool;

    // Users
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<User>>;
    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>>;
    /// Case-insensitive lookup
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    /// Fails with [`StorageError::Conflict`] when the username is taken.
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StorageResult<Option<User>>;
    /// Listings owned by the user are kept and lose their owner.
    async fn delete_user(&self, id: Uuid) -> StorageResult<bool>;
    async fn count_users(
        &self,
        role: Option<UserRole>,
        active: Option<bool>,
    ) -> StorageResult<u64>;

    // Products
    async fn list_products(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Product>>;
    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>>;
    async fn create_product(
        &self,
        input: CreateProductRequest,
        meta: ListingMeta,
    ) -> StorageResult<Product>;
    async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductRequest,
    ) -> StorageResult<Option<Product>>;
    async fn delete_product(&self, id: Uuid) -> StorageResult<bool>;

    // Services
    async fn list_services(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Service>>;
    async fn get_service(&self, id: Uuid) -> StorageResult<Option<Service>>;
    async fn create_service(
        &self,
        input: CreateServiceRequest,
        meta: ListingMeta,
    ) -> StorageResult<Service>;
    async fn update_service(
        &self,
        id: Uuid,
        input: UpdateServiceRequest,
    ) -> StorageResult<Option<Service>>;
    async fn delete_service(&self, id: Uuid) -> StorageResult<bool>;

    // Jobs
    async fn list_jobs(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Job>>;
    async fn get_job(&self, id: Uuid) -> StorageResult<Option<Job>>;
    async fn create_job(&self, input: CreateJobRequest, meta: ListingMeta) -> StorageResult<Job>;
    async fn update_job(&self, id: Uuid, input: UpdateJobRequest) -> StorageResult<Option<Job>>;
    async fn delete_job(&self, id: Uuid) -> StorageResult<bool>;

    // Announcements
    async fn list_announcements(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Announcement>>;
    async fn get_announcement(&self, id: Uuid) -> StorageResult<Option<Announcement>>;
    async fn create_announcement(
        &self,
        input: CreateAnnouncementRequest,
        meta: ListingMeta,
    ) -> StorageResult<Announcement>;
    async fn update_announcement(
        &self,
        id: Uuid,
        input: UpdateAnnouncementRequest,
    ) -> StorageResult<Option<Announcement>>;
    async fn delete_announcement(&self, id: Uuid) -> StorageResult<bool>;

    // Moderation
    /// Returns false when no listing of that kind has the id.
    async fn set_listing_approval(
        &self,
        kind: ListingKind,
        id: Uuid,
        approved: bool,
    ) -> StorageResult<bool>;
    async fn count_listings(&self, kind: ListingKind, approved: Option<bool>)
        -> StorageResult<u64>;

    // Audit log
    async fn record_audit(&self, entry: NewAuditEntry) -> StorageResult<AuditEntry>;
    async fn list_audit(&self, page: &PaginationParams) -> StorageResult<Page<AuditEntry>>;

    /// Every row of every table, for backups.
    async fn snapshot(&self) -> StorageResult<Snapshot>;
}

/// Trimmed, non-empty search term.
pub(crate) fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}
