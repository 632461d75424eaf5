//! User account routes
//!
//! Admins manage every account; other users may read and edit their own.

use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::admin::log_admin_action;
use crate::api::{
    ApiPath, ApiQuery, Created, DataResponse, NoContent, Paginated, PaginationParams,
    ValidatedJson,
};
use crate::app::AppState;
use crate::auth::{hash_password, RequireAdmin, RequireAuth};
use crate::domain::admin::{AdminAction, AuditTargetType};
use crate::domain::{
    CreateUserRequest, NewUser, UpdateUserRequest, UserFilter, UserPatch, UserResponse, UserRole,
};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize, Default)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

fn user_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("User {id} not found"))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    WithRejection(Query(query), _): ApiQuery<UserQuery>,
) -> ApiResult<Paginated<UserResponse>> {
    let params = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = UserFilter {
        search: query.search,
        role: query.role,
        is_active: query.is_active,
    };

    let page = state.storage.list_users(&filter, &params).await?;
    Ok(Paginated::from_page(page.map(UserResponse::from), &params))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Created<UserResponse>> {
    let account = req.account;
    let user = state
        .storage
        .create_user(NewUser {
            username: account.username.trim().to_string(),
            email: account.email.trim().to_string(),
            full_name: account.full_name.trim().to_string(),
            phone: account.phone,
            role: req.role,
            password_hash: hash_password(&account.password)?,
        })
        .await?;

    log_admin_action(
        state.storage.as_ref(),
        &admin,
        AdminAction::CreateUser,
        AuditTargetType::User,
        Some(user.id),
        serde_json::json!({ "username": user.username, "role": user.role }),
    )
    .await;

    Ok(Created(user.into()))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<DataResponse<UserResponse>> {
    if id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::forbidden("You may only view your own account"));
    }

    let user = state
        .storage
        .get_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    Ok(DataResponse::new(user.into()))
}

/// PUT /api/users/:id
///
/// Profile fields and password for the account owner; `role` and
/// `is_active` additionally for admins.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<DataResponse<UserResponse>> {
    let is_self = id == auth.user_id;
    if !is_self && !auth.is_admin() {
        return Err(ApiError::forbidden("You may only edit your own account"));
    }
    if req.touches_privileges() && !auth.is_admin() {
        return Err(ApiError::forbidden("Only admins may change roles or account status"));
    }
    if is_self && req.role.is_some_and(|r| r != UserRole::Admin) {
        return Err(ApiError::bad_request("You cannot remove your own admin role"));
    }
    if is_self && req.is_active == Some(false) {
        return Err(ApiError::bad_request("You cannot deactivate your own account"));
    }

    let password_hash = req.password.as_deref().map(hash_password).transpose()?;
    let role = req.role;
    let is_active = req.is_active;

    let user = state
        .storage
        .update_user(
            id,
            UserPatch {
                email: req.email.map(|e| e.trim().to_string()),
                full_name: req.full_name.map(|n| n.trim().to_string()),
                phone: req.phone,
                role,
                is_active,
                password_hash,
            },
        )
        .await?
        .ok_or_else(|| user_not_found(id))?;

    if let Some(role) = role {
        log_admin_action(
            state.storage.as_ref(),
            &auth,
            AdminAction::ChangeUserRole,
            AuditTargetType::User,
            Some(id),
            serde_json::json!({ "to": role }),
        )
        .await;
    }
    if let Some(active) = is_active {
        let action = if active {
            AdminAction::ActivateUser
        } else {
            AdminAction::DeactivateUser
        };
        log_admin_action(
            state.storage.as_ref(),
            &auth,
            action,
            AuditTargetType::User,
            Some(id),
            serde_json::json!({ "username": user.username }),
        )
        .await;
    }

    tracing::info!(user_id = %id, actor_id = %auth.user_id, "User updated");

    Ok(DataResponse::new(user.into()))
}

/// DELETE /api/users/:id
///
/// Listings created by the account are kept without an owner.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<NoContent> {
    if id == admin.user_id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let user = state
        .storage
        .get_user(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    if !state.storage.delete_user(id).await? {
        return Err(user_not_found(id));
    }

    log_admin_action(
        state.storage.as_ref(),
        &admin,
        AdminAction::DeleteUser,
        AuditTargetType::User,
        Some(id),
        serde_json::json!({ "username": user.username }),
    )
    .await;

    Ok(NoContent)
}
