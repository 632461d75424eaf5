//! In-memory storage: one `Vec` per entity behind a single lock.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Storage, StorageBackend, StorageError, StorageResult};
use crate::api::{Page, PaginationParams};
use crate::domain::admin::{AuditEntry, NewAuditEntry, Snapshot};
use crate::domain::*;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    services: Vec<Service>,
    jobs: Vec<Job>,
    announcements: Vec<Announcement>,
    audit_log: Vec<AuditEntry>,
}

/// List-based storage used when no database is configured.
///
/// Rows are appended in creation order, so iterating in reverse yields the
/// newest-first order the SQL backend produces with `ORDER BY created_at DESC`.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest-first page of the rows matching `keep`.
fn page_of<'a, T: Clone + 'a>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    keep: impl Fn(&T) -> bool,
    page: &PaginationParams,
) -> Page<T> {
    let matching: Vec<&T> = rows.rev().filter(|row| keep(row)).collect();
    Page {
        total: matching.len() as u64,
        items: page.slice(&matching).into_iter().cloned().collect(),
    }
}

trait Filterable {
    fn passes(&self, filter: &ListingFilter) -> bool;
}

impl Filterable for Product {
    fn passes(&self, f: &ListingFilter) -> bool {
        f.matches(
            &self.category,
            &[
                Some(self.name.as_str()),
                Some(self.description.as_str()),
                self.location.as_deref(),
            ],
            self.user_id,
            self.is_approved,
            self.is_active,
        )
    }
}

impl Filterable for Service {
    fn passes(&self, f: &ListingFilter) -> bool {
        f.matches(
            &self.category,
            &[
                Some(self.name.as_str()),
                Some(self.description.as_str()),
                self.location.as_deref(),
            ],
            self.user_id,
            self.is_approved,
            self.is_active,
        )
    }
}

impl Filterable for Job {
    fn passes(&self, f: &ListingFilter) -> bool {
        if f.job_type.is_some_and(|job_type| job_type != self.job_type) {
            return false;
        }
        f.matches(
            &self.category,
            &[
                Some(self.title.as_str()),
                Some(self.description.as_str()),
                Some(self.company.as_str()),
                self.location.as_deref(),
            ],
            self.user_id,
            self.is_approved,
            self.is_active,
        )
    }
}

impl Filterable for Announcement {
    fn passes(&self, f: &ListingFilter) -> bool {
        f.matches(
            &self.category,
            &[
                Some(self.title.as_str()),
                Some(self.content.as_str()),
                self.location.as_deref(),
            ],
            self.user_id,
            self.is_approved,
            self.is_active,
        )
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> bool {
    let before = rows.len();
    rows.retain(|row| id_of(row) != id);
    rows.len() != before
}

fn set_approval<T: Listing>(rows: &mut [T], id: Uuid, approve: impl Fn(&mut T)) -> bool {
    match rows.iter_mut().find(|row| row.id() == id) {
        Some(row) => {
            approve(row);
            true
        }
        None => false,
    }
}

fn count_approved<T: Listing>(rows: &[T], approved: Option<bool>) -> u64 {
    rows.iter()
        .filter(|row| approved.map_or(true, |wanted| row.is_approved() == wanted))
        .count() as u64
}

#[async_trait]
impl Storage for MemoryStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn health_check(&self) -> bool {
        true
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<User>> {
        let tables = self.tables.read();
        Ok(page_of(tables.users.iter(), |u| filter.matches(u), page))
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let wanted = username.to_lowercase();
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut tables = self.tables.write();
        let wanted = user.username.to_lowercase();
        if tables
            .users
            .iter()
            .any(|u| u.username.to_lowercase() == wanted)
        {
            return Err(StorageError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            is_active: true,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StorageResult<Option<User>> {
        let mut tables = self.tables.write();
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write();
        let removed = remove_by_id(&mut tables.users, id, |u| u.id);
        if removed {
            let orphan = |owner: &mut Option<Uuid>| {
                if *owner == Some(id) {
                    *owner = None;
                }
            };
            tables.products.iter_mut().for_each(|p| orphan(&mut p.user_id));
            tables.services.iter_mut().for_each(|s| orphan(&mut s.user_id));
            tables.jobs.iter_mut().for_each(|j| orphan(&mut j.user_id));
            tables
                .announcements
                .iter_mut()
                .for_each(|a| orphan(&mut a.user_id));
        }
        Ok(removed)
    }

    async fn count_users(
        &self,
        role: Option<UserRole>,
        active: Option<bool>,
    ) -> StorageResult<u64> {
        let filter = UserFilter {
            role,
            is_active: active,
            search: None,
        };
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .filter(|u| filter.matches(u))
            .count() as u64)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    async fn list_products(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Product>> {
        let tables = self.tables.read();
        Ok(page_of(tables.products.iter(), |p| p.passes(filter), page))
    }

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>> {
        Ok(self.tables.read().products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(
        &self,
        input: CreateProductRequest,
        meta: ListingMeta,
    ) -> StorageResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            category: input.category,
            price: input.price,
            location: input.location,
            image_url: input.image_url,
            contact_phone: input.contact_phone,
            contact_whatsapp: input.contact_whatsapp,
            is_approved: meta.is_approved,
            is_active: true,
            user_id: meta.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductRequest,
    ) -> StorageResult<Option<Product>> {
        let mut tables = self.tables.write();
        Ok(tables.products.iter_mut().find(|p| p.id == id).map(|product| {
            input.apply(product);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> StorageResult<bool> {
        Ok(remove_by_id(&mut self.tables.write().products, id, |p| p.id))
    }

    // ------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------

    async fn list_services(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Service>> {
        let tables = self.tables.read();
        Ok(page_of(tables.services.iter(), |s| s.passes(filter), page))
    }

    async fn get_service(&self, id: Uuid) -> StorageResult<Option<Service>> {
        Ok(self.tables.read().services.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(
        &self,
        input: CreateServiceRequest,
        meta: ListingMeta,
    ) -> StorageResult<Service> {
        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            category: input.category,
            price: input.price,
            location: input.location,
            image_url: input.image_url,
            contact_phone: input.contact_phone,
            contact_email: input.contact_email,
            is_approved: meta.is_approved,
            is_active: true,
            user_id: meta.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().services.push(service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: Uuid,
        input: UpdateServiceRequest,
    ) -> StorageResult<Option<Service>> {
        let mut tables = self.tables.write();
        Ok(tables.services.iter_mut().find(|s| s.id == id).map(|service| {
            input.apply(service);
            service.clone()
        }))
    }

    async fn delete_service(&self, id: Uuid) -> StorageResult<bool> {
        Ok(remove_by_id(&mut self.tables.write().services, id, |s| s.id))
    }

    // ------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------

    async fn list_jobs(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Job>> {
        let tables = self.tables.read();
        Ok(page_of(tables.jobs.iter(), |j| j.passes(filter), page))
    }

    async fn get_job(&self, id: Uuid) -> StorageResult<Option<Job>> {
        Ok(self.tables.read().jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, input: CreateJobRequest, meta: ListingMeta) -> StorageResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            company: input.company,
            category: input.category,
            location: input.location,
            job_type: input.job_type,
            salary: input.salary,
            requirements: input.requirements,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            is_approved: meta.is_approved,
            is_active: true,
            user_id: meta.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, input: UpdateJobRequest) -> StorageResult<Option<Job>> {
        let mut tables = self.tables.write();
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            input.apply(job);
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> StorageResult<bool> {
        Ok(remove_by_id(&mut self.tables.write().jobs, id, |j| j.id))
    }

    // ------------------------------------------------------------------
    // Announcements
    // ------------------------------------------------------------------

    async fn list_announcements(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Announcement>> {
        let tables = self.tables.read();
        Ok(page_of(tables.announcements.iter(), |a| a.passes(filter), page))
    }

    async fn get_announcement(&self, id: Uuid) -> StorageResult<Option<Announcement>> {
        Ok(self
            .tables
            .read()
            .announcements
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create_announcement(
        &self,
        input: CreateAnnouncementRequest,
        meta: ListingMeta,
    ) -> StorageResult<Announcement> {
        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            category: input.category,
            location: input.location,
            image_url: input.image_url,
            contact_phone: input.contact_phone,
            is_approved: meta.is_approved,
            is_active: true,
            user_id: meta.user_id,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().announcements.push(announcement.clone());
        Ok(announcement)
    }

    async fn update_announcement(
        &self,
        id: Uuid,
        input: UpdateAnnouncementRequest,
    ) -> StorageResult<Option<Announcement>> {
        let mut tables = self.tables.write();
        Ok(tables
            .announcements
            .iter_mut()
            .find(|a| a.id == id)
            .map(|announcement| {
                input.apply(announcement);
                announcement.clone()
            }))
    }

    async fn delete_announcement(&self, id: Uuid) -> StorageResult<bool> {
        Ok(remove_by_id(&mut self.tables.write().announcements, id, |a| a.id))
    }

    // ------------------------------------------------------------------
    // Moderation
    // ------------------------------------------------------------------

    async fn set_listing_approval(
        &self,
        kind: ListingKind,
        id: Uuid,
        approved: bool,
    ) -> StorageResult<bool> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let found = match kind {
            ListingKind::Products => set_approval(&mut tables.products, id, |p| {
                p.is_approved = approved;
                p.updated_at = now;
            }),
            ListingKind::Services => set_approval(&mut tables.services, id, |s| {
                s.is_approved = approved;
                s.updated_at = now;
            }),
            ListingKind::Jobs => set_approval(&mut tables.jobs, id, |j| {
                j.is_approved = approved;
                j.updated_at = now;
            }),
            ListingKind::Announcements => set_approval(&mut tables.announcements, id, |a| {
                a.is_approved = approved;
                a.updated_at = now;
            }),
        };
        Ok(found)
    }

    async fn count_listings(
        &self,
        kind: ListingKind,
        approved: Option<bool>,
    ) -> StorageResult<u64> {
        let tables = self.tables.read();
        Ok(match kind {
            ListingKind::Products => count_approved(&tables.products, approved),
            ListingKind::Services => count_approved(&tables.services, approved),
            ListingKind::Jobs => count_approved(&tables.jobs, approved),
            ListingKind::Announcements => count_approved(&tables.announcements, approved),
        })
    }

    // ------------------------------------------------------------------
    // Audit log
    // ------------------------------------------------------------------

    async fn record_audit(&self, entry: NewAuditEntry) -> StorageResult<AuditEntry> {
        let created = AuditEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            actor_username: entry.actor_username,
            action: entry.action.to_string(),
            target_type: entry.target_type.to_string(),
            target_id: entry.target_id,
            details: entry.details,
            created_at: Utc::now(),
        };
        self.tables.write().audit_log.push(created.clone());
        Ok(created)
    }

    async fn list_audit(&self, page: &PaginationParams) -> StorageResult<Page<AuditEntry>> {
        let tables = self.tables.read();
        Ok(page_of(tables.audit_log.iter(), |_| true, page))
    }

    async fn snapshot(&self) -> StorageResult<Snapshot> {
        let tables = self.tables.read();
        Ok(Snapshot {
            users: tables.users.iter().cloned().map(UserResponse::from).collect(),
            products: tables.products.clone(),
            services: tables.services.clone(),
            jobs: tables.jobs.clone(),
            announcements: tables.announcements.clone(),
            audit_log: tables.audit_log.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::admin::{AdminAction, AuditTargetType};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: "Test User".to_string(),
            phone: None,
            role: UserRole::User,
            password_hash: "not-a-real-hash".to_string(),
        }
    }

    fn product(name: &str, category: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.to_string(),
            description: "A product description long enough".to_string(),
            category: category.to_string(),
            price: "5".to_string(),
            location: Some("Salmiya".to_string()),
            image_url: None,
            contact_phone: None,
            contact_whatsapp: None,
        }
    }

    fn approved() -> ListingMeta {
        ListingMeta {
            user_id: None,
            is_approved: true,
        }
    }

    #[tokio::test]
    async fn created_product_is_retrievable_unchanged() {
        let storage = MemoryStorage::new();
        let created = storage
            .create_product(product("Karkade", "food"), approved())
            .await
            .unwrap();

        let fetched = storage.get_product(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.price, "5");
    }

    #[tokio::test]
    async fn lists_are_newest_first_and_paginated() {
        let storage = MemoryStorage::new();
        for i in 0..5 {
            storage
                .create_product(product(&format!("item {i}"), "food"), approved())
                .await
                .unwrap();
        }

        let page = storage
            .list_products(&ListingFilter::public(), &PaginationParams::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["item 4", "item 3"]);
    }

    #[tokio::test]
    async fn filters_by_category_search_and_approval() {
        let storage = MemoryStorage::new();
        storage
            .create_product(product("Dates from Kassala", "food"), approved())
            .await
            .unwrap();
        storage
            .create_product(product("Leather sandals", "clothing"), approved())
            .await
            .unwrap();
        storage
            .create_product(product("Pending dates", "food"), ListingMeta::default())
            .await
            .unwrap();

        let page = PaginationParams::default();
        let by_category = ListingFilter {
            category: Some("FOOD".into()),
            ..ListingFilter::public()
        };
        assert_eq!(storage.list_products(&by_category, &page).await.unwrap().total, 1);

        let by_search = ListingFilter {
            search: Some("dates".into()),
            ..ListingFilter::default()
        };
        assert_eq!(storage.list_products(&by_search, &page).await.unwrap().total, 2);

        let pending = storage
            .list_products(&ListingFilter::pending(), &page)
            .await
            .unwrap();
        assert_eq!(pending.items.len(), 1);
        assert_eq!(pending.items[0].name, "Pending dates");
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let storage = MemoryStorage::new();
        let created = storage
            .create_product(product("Tobe fabric", "clothing"), approved())
            .await
            .unwrap();

        let updated = storage
            .update_product(
                created.id,
                UpdateProductRequest {
                    price: Some("12.250".into()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Tobe fabric");
        assert_eq!(updated.price, "12.250");
        assert!(!updated.is_active);

        let missing = storage
            .update_product(Uuid::new_v4(), UpdateProductRequest::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn usernames_are_unique_case_insensitively() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("Hassan")).await.unwrap();
        let err = storage.create_user(new_user("hassan")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let found = storage.get_user_by_username("HASSAN").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn deleting_a_user_orphans_their_listings() {
        let storage = MemoryStorage::new();
        let user = storage.create_user(new_user("seller")).await.unwrap();
        let listing = storage
            .create_product(
                product("Incense burner", "home"),
                ListingMeta {
                    user_id: Some(user.id),
                    is_approved: true,
                },
            )
            .await
            .unwrap();

        assert!(storage.delete_user(user.id).await.unwrap());
        assert!(!storage.delete_user(user.id).await.unwrap());
        let listing = storage.get_product(listing.id).await.unwrap().unwrap();
        assert_eq!(listing.user_id, None);
    }

    #[tokio::test]
    async fn approval_and_counts() {
        let storage = MemoryStorage::new();
        let job = storage
            .create_job(
                CreateJobRequest {
                    title: "Cook".into(),
                    description: "Sudanese kitchen in Farwaniya".into(),
                    company: "Umm Durman Restaurant".into(),
                    category: "hospitality".into(),
                    job_type: JobType::PartTime,
                    location: None,
                    salary: None,
                    requirements: None,
                    contact_email: None,
                    contact_phone: Some("+965 5000 0000".into()),
                },
                ListingMeta::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            storage.count_listings(ListingKind::Jobs, Some(false)).await.unwrap(),
            1
        );
        assert!(storage
            .set_listing_approval(ListingKind::Jobs, job.id, true)
            .await
            .unwrap());
        assert!(!storage
            .set_listing_approval(ListingKind::Products, job.id, true)
            .await
            .unwrap());
        assert_eq!(
            storage.count_listings(ListingKind::Jobs, Some(true)).await.unwrap(),
            1
        );

        let full_time = ListingFilter {
            job_type: Some(JobType::FullTime),
            ..ListingFilter::public()
        };
        let page = PaginationParams::default();
        assert_eq!(storage.list_jobs(&full_time, &page).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn snapshot_excludes_password_hashes() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("auditor")).await.unwrap();
        storage
            .record_audit(NewAuditEntry {
                actor_id: None,
                actor_username: "system".into(),
                action: AdminAction::ExportBackup,
                target_type: AuditTargetType::System,
                target_id: None,
                details: serde_json::json!({}),
            })
            .await
            .unwrap();

        let snapshot = storage.snapshot().await.unwrap();
        assert_eq!(snapshot.counts().users, 1);
        assert_eq!(snapshot.counts().audit_entries, 1);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("password"));
    }
}
