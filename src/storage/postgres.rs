//! PostgreSQL storage over a `sqlx` pool.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{search_term, Storage, StorageBackend, StorageError, StorageResult};
use crate::api::{Page, PaginationParams};
use crate::domain::admin::{AuditEntry, NewAuditEntry, Snapshot};
use crate::domain::*;

pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_listings<T>(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} WHERE TRUE",
            kind.as_str()
        ));
        push_listing_filter(&mut count, kind, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT * FROM {} WHERE TRUE", kind.as_str()));
        push_listing_filter(&mut query, kind, filter);
        push_page(&mut query, page);
        let items = query.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn get_listing<T>(&self, kind: ListingKind, id: Uuid) -> StorageResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.as_str());
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_listing(&self, kind: ListingKind, id: Uuid) -> StorageResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.as_str());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn all_rows<T>(&self, table: &str) -> StorageResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {table} ORDER BY created_at");
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }
}

/// Columns matched by the free-text `search` filter.
fn search_columns(kind: ListingKind) -> &'static [&'static str] {
    match kind {
        ListingKind::Products | ListingKind::Services => &["name", "description", "location"],
        ListingKind::Jobs => &["title", "description", "company", "location"],
        ListingKind::Announcements => &["title", "content", "location"],
    }
}

/// `%term%` with LIKE wildcards escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{column} ILIKE "));
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

fn push_listing_filter(qb: &mut QueryBuilder<'_, Postgres>, kind: ListingKind, f: &ListingFilter) {
    if let Some(approved) = f.approved {
        qb.push(" AND is_approved = ").push_bind(approved);
    }
    if !f.include_inactive {
        qb.push(" AND is_active");
    }
    if let Some(user_id) = f.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(category) = f.category.as_deref() {
        qb.push(" AND LOWER(category) = LOWER(")
            .push_bind(category.to_string())
            .push(")");
    }
    if let (ListingKind::Jobs, Some(job_type)) = (kind, f.job_type) {
        qb.push(" AND job_type = ").push_bind(job_type);
    }
    if let Some(term) = search_term(f.search.as_deref()) {
        push_search(qb, search_columns(kind), term);
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: &PaginationParams) {
    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(i64::from(page.limit()))
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, f: &UserFilter) {
    if let Some(role) = f.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(active) = f.is_active {
        qb.push(" AND is_active = ").push_bind(active);
    }
    if let Some(term) = search_term(f.search.as_deref()) {
        push_search(qb, &["username", "email", "full_name"], term);
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Postgres
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<User>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        push_user_filter(&mut query, filter);
        push_page(&mut query, page);
        let items = query.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, full_name, phone, role, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StorageError::Conflict(format!("username '{}' is already taken", user.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                role = COALESCE($6, role),
                is_active = COALESCE($7, is_active),
                password_hash = COALESCE($8, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.full_name)
        .bind(patch.phone.is_some())
        .bind(patch.phone.flatten())
        .bind(patch.role)
        .bind(patch.is_active)
        .bind(patch.password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        // Listing foreign keys are ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_users(
        &self,
        role: Option<UserRole>,
        active: Option<bool>,
    ) -> StorageResult<u64> {
        let filter = UserFilter {
            search: None,
            role,
            is_active: active,
        };
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filter(&mut count, &filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    async fn list_products(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Product>> {
        self.list_listings(ListingKind::Products, filter, page).await
    }

    async fn get_product(&self, id: Uuid) -> StorageResult<Option<Product>> {
        self.get_listing(ListingKind::Products, id).await
    }

    async fn create_product(
        &self,
        input: CreateProductRequest,
        meta: ListingMeta,
    ) -> StorageResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, name, description, category, price, location, image_url,
                contact_phone, contact_whatsapp, is_approved, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.description)
        .bind(input.category)
        .bind(input.price)
        .bind(input.location)
        .bind(input.image_url)
        .bind(input.contact_phone)
        .bind(input.contact_whatsapp)
        .bind(meta.is_approved)
        .bind(meta.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductRequest,
    ) -> StorageResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                price = COALESCE($5, price),
                location = CASE WHEN $6 THEN $7 ELSE location END,
                image_url = CASE WHEN $8 THEN $9 ELSE image_url END,
                contact_phone = CASE WHEN $10 THEN $11 ELSE contact_phone END,
                contact_whatsapp = CASE WHEN $12 THEN $13 ELSE contact_whatsapp END,
                is_active = COALESCE($14, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.category)
        .bind(input.price)
        .bind(input.location.is_some())
        .bind(input.location.flatten())
        .bind(input.image_url.is_some())
        .bind(input.image_url.flatten())
        .bind(input.contact_phone.is_some())
        .bind(input.contact_phone.flatten())
        .bind(input.contact_whatsapp.is_some())
        .bind(input.contact_whatsapp.flatten())
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_listing(ListingKind::Products, id).await
    }

    // ------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------

    async fn list_services(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Service>> {
        self.list_listings(ListingKind::Services, filter, page).await
    }

    async fn get_service(&self, id: Uuid) -> StorageResult<Option<Service>> {
        self.get_listing(ListingKind::Services, id).await
    }

    async fn create_service(
        &self,
        input: CreateServiceRequest,
        meta: ListingMeta,
    ) -> StorageResult<Service> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (
                id, name, description, category, price, location, image_url,
                contact_phone, contact_email, is_approved, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.description)
        .bind(input.category)
        .bind(input.price)
        .bind(input.location)
        .bind(input.image_url)
        .bind(input.contact_phone)
        .bind(input.contact_email)
        .bind(meta.is_approved)
        .bind(meta.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }

    async fn update_service(
        &self,
        id: Uuid,
        input: UpdateServiceRequest,
    ) -> StorageResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                price = CASE WHEN $5 THEN $6 ELSE price END,
                location = CASE WHEN $7 THEN $8 ELSE location END,
                image_url = CASE WHEN $9 THEN $10 ELSE image_url END,
                contact_phone = CASE WHEN $11 THEN $12 ELSE contact_phone END,
                contact_email = CASE WHEN $13 THEN $14 ELSE contact_email END,
                is_active = COALESCE($15, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.category)
        .bind(input.price.is_some())
        .bind(input.price.flatten())
        .bind(input.location.is_some())
        .bind(input.location.flatten())
        .bind(input.image_url.is_some())
        .bind(input.image_url.flatten())
        .bind(input.contact_phone.is_some())
        .bind(input.contact_phone.flatten())
        .bind(input.contact_email.is_some())
        .bind(input.contact_email.flatten())
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    async fn delete_service(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_listing(ListingKind::Services, id).await
    }

    // ------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------

    async fn list_jobs(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Job>> {
        self.list_listings(ListingKind::Jobs, filter, page).await
    }

    async fn get_job(&self, id: Uuid) -> StorageResult<Option<Job>> {
        self.get_listing(ListingKind::Jobs, id).await
    }

    async fn create_job(&self, input: CreateJobRequest, meta: ListingMeta) -> StorageResult<Job> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, title, description, company, category, location, job_type,
                salary, requirements, contact_email, contact_phone, is_approved, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.title)
        .bind(input.description)
        .bind(input.company)
        .bind(input.category)
        .bind(input.location)
        .bind(input.job_type)
        .bind(input.salary)
        .bind(input.requirements)
        .bind(input.contact_email)
        .bind(input.contact_phone)
        .bind(meta.is_approved)
        .bind(meta.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, input: UpdateJobRequest) -> StorageResult<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                company = COALESCE($4, company),
                category = COALESCE($5, category),
                job_type = COALESCE($6, job_type),
                location = CASE WHEN $7 THEN $8 ELSE location END,
                salary = CASE WHEN $9 THEN $10 ELSE salary END,
                requirements = CASE WHEN $11 THEN $12 ELSE requirements END,
                contact_email = CASE WHEN $13 THEN $14 ELSE contact_email END,
                contact_phone = CASE WHEN $15 THEN $16 ELSE contact_phone END,
                is_active = COALESCE($17, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title)
        .bind(input.description)
        .bind(input.company)
        .bind(input.category)
        .bind(input.job_type)
        .bind(input.location.is_some())
        .bind(input.location.flatten())
        .bind(input.salary.is_some())
        .bind(input.salary.flatten())
        .bind(input.requirements.is_some())
        .bind(input.requirements.flatten())
        .bind(input.contact_email.is_some())
        .bind(input.contact_email.flatten())
        .bind(input.contact_phone.is_some())
        .bind(input.contact_phone.flatten())
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn delete_job(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_listing(ListingKind::Jobs, id).await
    }

    // ------------------------------------------------------------------
    // Announcements
    // ------------------------------------------------------------------

    async fn list_announcements(
        &self,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Announcement>> {
        self.list_listings(ListingKind::Announcements, filter, page)
            .await
    }

    async fn get_announcement(&self, id: Uuid) -> StorageResult<Option<Announcement>> {
        self.get_listing(ListingKind::Announcements, id).await
    }

    async fn create_announcement(
        &self,
        input: CreateAnnouncementRequest,
        meta: ListingMeta,
    ) -> StorageResult<Announcement> {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements (
                id, title, content, category, location, image_url, contact_phone,
                is_approved, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.title)
        .bind(input.content)
        .bind(input.category)
        .bind(input.location)
        .bind(input.image_url)
        .bind(input.contact_phone)
        .bind(meta.is_approved)
        .bind(meta.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(announcement)
    }

    async fn update_announcement(
        &self,
        id: Uuid,
        input: UpdateAnnouncementRequest,
    ) -> StorageResult<Option<Announcement>> {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            UPDATE announcements SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                category = COALESCE($4, category),
                location = CASE WHEN $5 THEN $6 ELSE location END,
                image_url = CASE WHEN $7 THEN $8 ELSE image_url END,
                contact_phone = CASE WHEN $9 THEN $10 ELSE contact_phone END,
                is_active = COALESCE($11, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title)
        .bind(input.content)
        .bind(input.category)
        .bind(input.location.is_some())
        .bind(input.location.flatten())
        .bind(input.image_url.is_some())
        .bind(input.image_url.flatten())
        .bind(input.contact_phone.is_some())
        .bind(input.contact_phone.flatten())
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(announcement)
    }

    async fn delete_announcement(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_listing(ListingKind::Announcements, id).await
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
        let sql = format!(
            "UPDATE {} SET is_approved = $2, updated_at = NOW() WHERE id = $1",
            kind.as_str()
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(approved)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_listings(
        &self,
        kind: ListingKind,
        approved: Option<bool>,
    ) -> StorageResult<u64> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {} WHERE TRUE",
            kind.as_str()
        ));
        if let Some(approved) = approved {
            count.push(" AND is_approved = ").push_bind(approved);
        }
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }

    // ------------------------------------------------------------------
    // Audit log
    // ------------------------------------------------------------------

    async fn record_audit(&self, entry: NewAuditEntry) -> StorageResult<AuditEntry> {
        let created = sqlx::query_as::<_, AuditEntry>(
            r#"
            INSERT INTO admin_audit_log (
                id, actor_id, actor_username, action, target_type, target_id, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(entry.actor_username)
        .bind(entry.action.to_string())
        .bind(entry.target_type.to_string())
        .bind(entry.target_id)
        .bind(entry.details)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_audit(&self, page: &PaginationParams) -> StorageResult<Page<AuditEntry>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_audit_log")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT * FROM admin_audit_log
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn snapshot(&self) -> StorageResult<Snapshot> {
        let users: Vec<User> = self.all_rows("users").await?;
        Ok(Snapshot {
            users: users.into_iter().map(UserResponse::from).collect(),
            products: self.all_rows("products").await?,
            services: self.all_rows("services").await?,
            jobs: self.all_rows("jobs").await?,
            announcements: self.all_rows("announcements").await?,
            audit_log: self.all_rows("admin_audit_log").await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("ful"), "%ful%");
    }

    #[test]
    fn listing_filter_renders_parameterized_sql() {
        let filter = ListingFilter {
            search: Some("kisra".into()),
            category: Some("food".into()),
            job_type: Some(JobType::PartTime),
            ..ListingFilter::public()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products WHERE TRUE");
        push_listing_filter(&mut qb, ListingKind::Products, &filter);
        let sql = qb.sql().to_string();
        assert!(sql.contains("is_approved = $1"));
        assert!(sql.contains(" AND is_active"));
        assert!(sql.contains("LOWER(category) = LOWER($2)"));
        assert!(!sql.contains("job_type"));
        assert!(sql.contains("name ILIKE $3 OR description ILIKE $4 OR location ILIKE $5"));

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs WHERE TRUE");
        push_listing_filter(&mut qb, ListingKind::Jobs, &filter);
        assert!(qb.sql().contains("job_type = $3"));
    }
}
