//! Listing routes
//!
//! Products, services, jobs and announcements share one set of handlers:
//! - `GET    /api/<kind>`      paginated, filtered list
//! - `POST   /api/<kind>`      create (pending unless auto-approved)
//! - `GET    /api/<kind>/:id`  single listing
//! - `PUT    /api/<kind>/:id`  partial update (owner or moderator)
//! - `DELETE /api/<kind>/:id`  hard delete (owner or moderator)
//!
//! Each kind plugs in through [`ListingResource`].

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::admin::log_admin_action;
use crate::api::{
    ApiPath, ApiQuery, Created, DataResponse, NoContent, Page, Paginated, PaginationParams,
    ValidatedJson,
};
use crate::app::AppState;
use crate::auth::{AuthContext, OptionalAuth, RequireAuth};
use crate::domain::admin::{AdminAction, AuditTargetType};
use crate::domain::*;
use crate::error::{ApiError, ApiResult};
use crate::storage::{Storage, StorageResult};
use crate::validation::{Validate, ValidationErrors};

/// Storage operations for one listing kind.
#[async_trait]
pub trait ListingResource: Listing + Serialize + Send + Sync + Sized + 'static {
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    async fn list(
        storage: &dyn Storage,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Self>>;
    async fn get(storage: &dyn Storage, id: Uuid) -> StorageResult<Option<Self>>;
    async fn create(
        storage: &dyn Storage,
        input: Self::Create,
        meta: ListingMeta,
    ) -> StorageResult<Self>;
    async fn update(
        storage: &dyn Storage,
        id: Uuid,
        input: Self::Update,
    ) -> StorageResult<Option<Self>>;
    async fn delete(storage: &dyn Storage, id: Uuid) -> StorageResult<bool>;

    /// Rules that depend on the stored listing as well as the update body.
    fn check_update(&self, _input: &Self::Update) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// List query parameters. `approved` and `include_inactive` are honoured for
/// moderators only; `job_type` only narrows job listings.
#[derive(Debug, Deserialize, Default)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<Uuid>,
    pub job_type: Option<JobType>,
    pub approved: Option<bool>,
    pub include_inactive: Option<bool>,
}

impl ListingQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    fn filter(&self, caller: Option<&AuthContext>) -> ListingFilter {
        let mut filter = ListingFilter {
            search: self.search.clone(),
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            user_id: self.user_id,
            job_type: self.job_type,
            ..ListingFilter::public()
        };
        if caller.is_some_and(AuthContext::can_moderate) {
            filter.approved = self.approved;
            filter.include_inactive = self.include_inactive.unwrap_or(false);
        }
        filter
    }
}

fn not_found<T: Listing>(id: Uuid) -> ApiError {
    ApiError::not_found(format!("{} {} not found", T::KIND.noun(), id))
}

/// Fetch a listing the caller may change, or fail with 404/403.
async fn load_managed<T: ListingResource>(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<T> {
    let listing = T::get(state.storage.as_ref(), id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

    if !auth.can_manage(listing.owner_id()) {
        tracing::warn!(
            user_id = %auth.user_id,
            kind = %T::KIND,
            listing_id = %id,
            "Attempt to modify a listing owned by someone else"
        );
        return Err(ApiError::forbidden(format!(
            "You may only change your own {}",
            T::KIND
        )));
    }
    Ok(listing)
}

/// GET /api/<kind>
pub async fn list<T: ListingResource>(
    State(state): State<Arc<AppState>>,
    OptionalAuth(caller): OptionalAuth,
    WithRejection(Query(query), _): ApiQuery<ListingQuery>,
) -> ApiResult<Paginated<T>> {
    let params = query.pagination();
    let filter = query.filter(caller.as_ref());
    let page = T::list(state.storage.as_ref(), &filter, &params).await?;
    Ok(Paginated::from_page(page, &params))
}

/// GET /api/<kind>/:id
///
/// Pending or inactive listings are only visible to their owner and moderators.
pub async fn get_one<T: ListingResource>(
    State(state): State<Arc<AppState>>,
    OptionalAuth(caller): OptionalAuth,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<DataResponse<T>> {
    let listing = T::get(state.storage.as_ref(), id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

    let visible = listing.is_public()
        || caller
            .as_ref()
            .is_some_and(|auth| auth.can_manage(listing.owner_id()));
    if !visible {
        return Err(not_found::<T>(id));
    }

    Ok(DataResponse::new(listing))
}

/// POST /api/<kind>
pub async fn create<T: ListingResource>(
    State(state): State<Arc<AppState>>,
    OptionalAuth(caller): OptionalAuth,
    ValidatedJson(input): ValidatedJson<T::Create>,
) -> ApiResult<Created<T>> {
    let meta = ListingMeta {
        user_id: caller.as_ref().map(|auth| auth.user_id),
        is_approved: state.settings.auto_approve_listings
            || caller.as_ref().is_some_and(AuthContext::can_moderate),
    };

    let listing = T::create(state.storage.as_ref(), input, meta).await?;

    tracing::info!(
        kind = %T::KIND,
        listing_id = %listing.id(),
        user_id = ?meta.user_id,
        approved = meta.is_approved,
        "Listing created"
    );

    Ok(Created(listing))
}

/// PUT /api/<kind>/:id
pub async fn update<T: ListingResource>(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    ValidatedJson(input): ValidatedJson<T::Update>,
) -> ApiResult<DataResponse<T>> {
    let existing = load_managed::<T>(&state, &auth, id).await?;
    existing.check_update(&input)?;

    let listing = T::update(state.storage.as_ref(), id, input)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;

    tracing::info!(kind = %T::KIND, listing_id = %id, user_id = %auth.user_id, "Listing updated");

    Ok(DataResponse::new(listing))
}

/// DELETE /api/<kind>/:id
pub async fn remove<T: ListingResource>(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<NoContent> {
    let listing = load_managed::<T>(&state, &auth, id).await?;

    if !T::delete(state.storage.as_ref(), id).await? {
        return Err(not_found::<T>(id));
    }

    // Moderators removing someone else's listing leave a trail.
    if listing.owner_id() != Some(auth.user_id) {
        log_admin_action(
            state.storage.as_ref(),
            &auth,
            AdminAction::DeleteListing,
            AuditTargetType::from(T::KIND),
            Some(id),
            serde_json::json!({ "owner_id": listing.owner_id() }),
        )
        .await;
    }

    tracing::info!(kind = %T::KIND, listing_id = %id, user_id = %auth.user_id, "Listing deleted");

    Ok(NoContent)
}

/// `/api/<kind>` and `/api/<kind>/:id` for one listing kind.
pub fn routes<T: ListingResource>() -> Router<Arc<AppState>> {
    let collection = format!("/api/{}", T::KIND);
    let item = format!("/api/{}/:id", T::KIND);

    Router::new()
        .route(&collection, get(list::<T>).post(create::<T>))
        .route(
            &item,
            get(get_one::<T>).put(update::<T>).delete(remove::<T>),
        )
}

// ============================================================================
// Listing kinds
// ============================================================================

#[async_trait]
impl ListingResource for Product {
    type Create = CreateProductRequest;
    type Update = UpdateProductRequest;

    async fn list(
        storage: &dyn Storage,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Self>> {
        storage.list_products(filter, page).await
    }

    async fn get(storage: &dyn Storage, id: Uuid) -> StorageResult<Option<Self>> {
        storage.get_product(id).await
    }

    async fn create(
        storage: &dyn Storage,
        input: Self::Create,
        meta: ListingMeta,
    ) -> StorageResult<Self> {
        storage.create_product(input, meta).await
    }

    async fn update(
        storage: &dyn Storage,
        id: Uuid,
        input: Self::Update,
    ) -> StorageResult<Option<Self>> {
        storage.update_product(id, input).await
    }

    async fn delete(storage: &dyn Storage, id: Uuid) -> StorageResult<bool> {
        storage.delete_product(id).await
    }
}

#[async_trait]
impl ListingResource for Service {
    type Create = CreateServiceRequest;
    type Update = UpdateServiceRequest;

    async fn list(
        storage: &dyn Storage,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Self>> {
        storage.list_services(filter, page).await
    }

    async fn get(storage: &dyn Storage, id: Uuid) -> StorageResult<Option<Self>> {
        storage.get_service(id).await
    }

    async fn create(
        storage: &dyn Storage,
        input: Self::Create,
        meta: ListingMeta,
    ) -> StorageResult<Self> {
        storage.create_service(input, meta).await
    }

    async fn update(
        storage: &dyn Storage,
        id: Uuid,
        input: Self::Update,
    ) -> StorageResult<Option<Self>> {
        storage.update_service(id, input).await
    }

    async fn delete(storage: &dyn Storage, id: Uuid) -> StorageResult<bool> {
        storage.delete_service(id).await
    }
}

#[async_trait]
impl ListingResource for Job {
    type Create = CreateJobRequest;
    type Update = UpdateJobRequest;

    async fn list(
        storage: &dyn Storage,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Self>> {
        storage.list_jobs(filter, page).await
    }

    async fn get(storage: &dyn Storage, id: Uuid) -> StorageResult<Option<Self>> {
        storage.get_job(id).await
    }

    async fn create(
        storage: &dyn Storage,
        input: Self::Create,
        meta: ListingMeta,
    ) -> StorageResult<Self> {
        storage.create_job(input, meta).await
    }

    async fn update(
        storage: &dyn Storage,
        id: Uuid,
        input: Self::Update,
    ) -> StorageResult<Option<Self>> {
        storage.update_job(id, input).await
    }

    async fn delete(storage: &dyn Storage, id: Uuid) -> StorageResult<bool> {
        storage.delete_job(id).await
    }

    fn check_update(&self, input: &Self::Update) -> Result<(), ValidationErrors> {
        input.check_against(self)
    }
}

#[async_trait]
impl ListingResource for Announcement {
    type Create = CreateAnnouncementRequest;
    type Update = UpdateAnnouncementRequest;

    async fn list(
        storage: &dyn Storage,
        filter: &ListingFilter,
        page: &PaginationParams,
    ) -> StorageResult<Page<Self>> {
        storage.list_announcements(filter, page).await
    }

    async fn get(storage: &dyn Storage, id: Uuid) -> StorageResult<Option<Self>> {
        storage.get_announcement(id).await
    }

    async fn create(
        storage: &dyn Storage,
        input: Self::Create,
        meta: ListingMeta,
    ) -> StorageResult<Self> {
        storage.create_announcement(input, meta).await
    }

    async fn update(
        storage: &dyn Storage,
        id: Uuid,
        input: Self::Update,
    ) -> StorageResult<Option<Self>> {
        storage.update_announcement(id, input).await
    }

    async fn delete(storage: &dyn Storage, id: Uuid) -> StorageResult<bool> {
        storage.delete_announcement(id).await
    }
}
