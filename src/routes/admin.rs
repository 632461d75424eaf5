//! Admin routes
//!
//! Back-office endpoints for:
//! - Dashboard statistics and the moderation queue (moderators)
//! - Approving and rejecting listings (moderators)
//! - Role and account status changes (admins)
//! - Audit log viewing and backups (admins)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ApiPath, ApiQuery, DataResponse, Paginated, PaginationParams, ValidatedJson};
use crate::app::AppState;
use crate::auth::{AuthContext, RequireAdmin, RequireModerator};
use crate::domain::admin::*;
use crate::domain::{ListingFilter, ListingKind, UserPatch, UserResponse, UserRole};
use crate::error::{ApiError, ApiResult};
use crate::storage::{Storage, StorageResult};

/// Format version of `GET /api/admin/backup/export` documents.
pub const BACKUP_FORMAT_VERSION: u32 = 1;

// ============================================================================
// Helper Functions
// ============================================================================

/// Log an admin action to the audit log. A failed write is logged and
/// does not fail the request.
pub(crate) async fn log_admin_action(
    storage: &dyn Storage,
    actor: &AuthContext,
    action: AdminAction,
    target_type: AuditTargetType,
    target_id: Option<Uuid>,
    details: serde_json::Value,
) {
    let entry = NewAuditEntry {
        actor_id: Some(actor.user_id),
        actor_username: actor.username.clone(),
        action,
        target_type,
        target_id,
        details,
    };

    match storage.record_audit(entry).await {
        Ok(_) => tracing::info!(
            admin_id = %actor.user_id,
            action = %action,
            target_type = %target_type,
            target_id = ?target_id,
            "Admin action logged"
        ),
        Err(e) => tracing::error!(
            error = %e,
            action = %action,
            "Failed to write audit log entry"
        ),
    }
}

async fn listing_counts(storage: &dyn Storage, kind: ListingKind) -> StorageResult<ListingCounts> {
    let (total, approved) = futures::try_join!(
        storage.count_listings(kind, None),
        storage.count_listings(kind, Some(true)),
    )?;
    Ok(ListingCounts {
        total,
        approved,
        pending: total.saturating_sub(approved),
    })
}

async fn user_counts(storage: &dyn Storage) -> StorageResult<UserCounts> {
    let (total, admins, moderators, active) = futures::try_join!(
        storage.count_users(None, None),
        storage.count_users(Some(UserRole::Admin), None),
        storage.count_users(Some(UserRole::Moderator), None),
        storage.count_users(None, Some(true)),
    )?;
    Ok(UserCounts {
        total,
        admins,
        moderators,
        active,
        inactive: total.saturating_sub(active),
    })
}

// ============================================================================
// Admin Dashboard
// ============================================================================

/// GET /api/admin/stats
///
/// Listing totals per kind and user totals by role and status.
pub async fn get_admin_stats(
    State(state): State<Arc<AppState>>,
    _moderator: RequireModerator,
) -> ApiResult<DataResponse<AdminDashboardStats>> {
    let storage = state.storage.as_ref();
    let (products, services, jobs, announcements, users) = futures::try_join!(
        listing_counts(storage, ListingKind::Products),
        listing_counts(storage, ListingKind::Services),
        listing_counts(storage, ListingKind::Jobs),
        listing_counts(storage, ListingKind::Announcements),
        user_counts(storage),
    )?;

    let pending_total =
        products.pending + services.pending + jobs.pending + announcements.pending;

    Ok(DataResponse::new(AdminDashboardStats {
        products,
        services,
        jobs,
        announcements,
        users,
        pending_total,
        generated_at: Utc::now(),
    }))
}

/// GET /api/admin/pending
///
/// First page of pending listings of every kind, newest first.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    _moderator: RequireModerator,
) -> ApiResult<DataResponse<PendingQueue>> {
    let storage = state.storage.as_ref();
    let filter = ListingFilter::pending();
    let page = PaginationParams::default();

    let (products, services, jobs, announcements) = futures::try_join!(
        storage.list_products(&filter, &page),
        storage.list_services(&filter, &page),
        storage.list_jobs(&filter, &page),
        storage.list_announcements(&filter, &page),
    )?;

    Ok(DataResponse::new(PendingQueue {
        products: products.items,
        services: services.items,
        jobs: jobs.items,
        announcements: announcements.items,
    }))
}

// ============================================================================
// Moderation
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModerationOutcome {
    pub kind: ListingKind,
    pub id: Uuid,
    pub is_approved: bool,
}

async fn moderate(
    state: &AppState,
    moderator: &AuthContext,
    kind: ListingKind,
    id: Uuid,
    approve: bool,
    reason: Option<String>,
) -> ApiResult<DataResponse<ModerationOutcome>> {
    if !state
        .storage
        .set_listing_approval(kind, id, approve)
        .await?
    {
        return Err(ApiError::not_found(format!("{} {} not found", kind.noun(), id)));
    }

    let action = if approve {
        AdminAction::ApproveListing
    } else {
        AdminAction::RejectListing
    };
    log_admin_action(
        state.storage.as_ref(),
        moderator,
        action,
        AuditTargetType::from(kind),
        Some(id),
        serde_json::json!({ "reason": reason }),
    )
    .await;

    Ok(DataResponse::new(ModerationOutcome {
        kind,
        id,
        is_approved: approve,
    }))
}

/// PUT /api/admin/:kind/:id/approve
pub async fn approve_listing(
    State(state): State<Arc<AppState>>,
    RequireModerator(moderator): RequireModerator,
    WithRejection(Path((kind, id)), _): ApiPath<(ListingKind, Uuid)>,
    body: Option<Json<ModerationRequest>>,
) -> ApiResult<DataResponse<ModerationOutcome>> {
    let reason = body.and_then(|Json(req)| req.reason);
    moderate(&state, &moderator, kind, id, true, reason).await
}

/// PUT /api/admin/:kind/:id/reject
///
/// Rejected listings go back to pending and disappear from public lists.
pub async fn reject_listing(
    State(state): State<Arc<AppState>>,
    RequireModerator(moderator): RequireModerator,
    WithRejection(Path((kind, id)), _): ApiPath<(ListingKind, Uuid)>,
    body: Option<Json<ModerationRequest>>,
) -> ApiResult<DataResponse<ModerationOutcome>> {
    let reason = body.and_then(|Json(req)| req.reason);
    moderate(&state, &moderator, kind, id, false, reason).await
}

// ============================================================================
// User Management
// ============================================================================

/// PUT /api/admin/users/:id/role
pub async fn change_user_role(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    WithRejection(Path(user_id), _): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> ApiResult<DataResponse<UserResponse>> {
    if user_id == admin.user_id && req.role != UserRole::Admin {
        return Err(ApiError::bad_request("You cannot remove your own admin role"));
    }

    let previous = state
        .storage
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;

    let user = state
        .storage
        .update_user(
            user_id,
            UserPatch {
                role: Some(req.role),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;

    log_admin_action(
        state.storage.as_ref(),
        &admin,
        AdminAction::ChangeUserRole,
        AuditTargetType::User,
        Some(user_id),
        serde_json::json!({ "from": previous.role, "to": req.role }),
    )
    .await;

    Ok(DataResponse::new(user.into()))
}

/// PUT /api/admin/users/:id/status
pub async fn change_user_status(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    WithRejection(Path(user_id), _): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> ApiResult<DataResponse<UserResponse>> {
    if user_id == admin.user_id && !req.is_active {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }

    let user = state
        .storage
        .update_user(
            user_id,
            UserPatch {
                is_active: Some(req.is_active),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;

    let action = if req.is_active {
        AdminAction::ActivateUser
    } else {
        AdminAction::DeactivateUser
    };
    log_admin_action(
        state.storage.as_ref(),
        &admin,
        action,
        AuditTargetType::User,
        Some(user_id),
        serde_json::json!({ "username": user.username }),
    )
    .await;

    Ok(DataResponse::new(user.into()))
}

// ============================================================================
// Audit Log
// ============================================================================

/// GET /api/admin/logs
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    WithRejection(Query(params), _): ApiQuery<PaginationParams>,
) -> ApiResult<Paginated<AuditEntry>> {
    let page = state.storage.list_audit(&params).await?;
    Ok(Paginated::from_page(page, &params))
}

// ============================================================================
// Backups
// ============================================================================

/// GET /api/admin/backup
///
/// Row counts and backend of what an export would contain.
pub async fn get_backup_info(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> ApiResult<DataResponse<BackupMetadata>> {
    let snapshot = state.storage.snapshot().await?;
    Ok(DataResponse::new(backup_metadata(&state, &snapshot)))
}

/// GET /api/admin/backup/export
///
/// Full JSON export of every table. Password hashes are never included.
pub async fn export_backup(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
) -> ApiResult<Json<BackupExport>> {
    let snapshot = state.storage.snapshot().await?;
    let metadata = backup_metadata(&state, &snapshot);

    log_admin_action(
        state.storage.as_ref(),
        &admin,
        AdminAction::ExportBackup,
        AuditTargetType::System,
        None,
        serde_json::json!({ "counts": metadata.counts }),
    )
    .await;

    Ok(Json(BackupExport {
        metadata,
        data: snapshot,
    }))
}

fn backup_metadata(state: &AppState, snapshot: &Snapshot) -> BackupMetadata {
    BackupMetadata {
        backend: state.storage.backend().to_string(),
        generated_at: Utc::now(),
        counts: snapshot.counts(),
        format_version: BACKUP_FORMAT_VERSION,
    }
}
