//! Authentication routes
//!
//! Local accounts with Argon2 password hashes; sessions are HS256 bearer tokens.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::api::{Created, DataResponse, ValidatedJson};
use crate::app::AppState;
use crate::auth::{hash_password, verify_password, RequireAuth};
use crate::domain::{LoginRequest, NewUser, RegisterRequest, User, UserResponse, UserRole};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

fn issue_session(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let issued = state
        .tokens
        .issue(&user)
        .map_err(|e| anyhow::anyhow!("failed to sign token: {e}"))?;

    Ok(AuthResponse {
        access_token: issued.token,
        token_type: "Bearer",
        expires_at: issued.expires_at,
        user: user.into(),
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<DataResponse<AuthResponse>> {
    let user = state
        .storage
        .get_user_by_username(req.username.trim())
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| {
            tracing::warn!(username = %req.username, "Failed login attempt");
            ApiError::unauthorized("Invalid username or password")
        })?;

    if !user.is_active {
        return Err(ApiError::forbidden("This account has been deactivated"));
    }

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(DataResponse::new(issue_session(&state, user)?))
}

/// POST /api/auth/register
///
/// Self-service accounts always get the `user` role.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<AuthResponse>> {
    let user = state
        .storage
        .create_user(NewUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            full_name: req.full_name.trim().to_string(),
            phone: req.phone,
            role: UserRole::User,
            password_hash: hash_password(&req.password)?,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(Created(issue_session(&state, user)?))
}

/// GET /api/auth/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    RequireAuth(auth): RequireAuth,
) -> ApiResult<DataResponse<UserResponse>> {
    let user = state
        .storage
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(DataResponse::new(user.into()))
}
