use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::AuthContext;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::RequestIdExt;
use crate::storage::StorageError;

/// Extractor that requires authentication
/// Use this in route handlers to require a valid bearer token for an active account
///
/// Example:
/// ```ignore
/// async fn protected_route(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}", auth.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthContext);

impl std::ops::Deref for RequireAuth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Caller context when a token is presented, `None` for anonymous requests.
/// A presented but invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthContext>);

/// Admin or moderator
#[derive(Debug, Clone)]
pub struct RequireModerator(pub AuthContext);

impl std::ops::Deref for RequireModerator {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthContext);

impl std::ops::Deref for RequireAdmin {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid authorization format")]
    InvalidFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account is disabled or no longer exists")]
    InactiveAccount,

    #[error("Moderator privileges required")]
    NotModerator,

    #[error("Admin privileges required")]
    NotAdmin,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotModerator | AuthError::NotAdmin => ApiError::forbidden(err.to_string()),
            AuthError::Storage(e) => e.into(),
            _ => ApiError::unauthorized(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Resolve the bearer token, if any, to an active stored account.
async fn authenticate(
    parts: &mut Parts,
    state: &Arc<AppState>,
) -> Result<Option<AuthContext>, AuthError> {
    let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        Err(rejection) if rejection.is_missing() => return Ok(None),
        Err(_) => return Err(AuthError::InvalidFormat),
    };

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::warn!(
            error = %e,
            request_id = parts.headers.request_id().unwrap_or("-"),
            "JWT verification failed"
        );
        AuthError::InvalidToken
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

    match state.storage.get_user(user_id).await? {
        Some(user) if user.is_active => Ok(Some(AuthContext::from_user(&user))),
        _ => {
            tracing::warn!(user_id = %user_id, "Token presented for inactive or deleted account");
            Err(AuthError::InactiveAccount)
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .map(RequireAuth)
            .ok_or(AuthError::MissingToken)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(authenticate(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireModerator {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(auth) = RequireAuth::from_request_parts(parts, state).await?;
        if !auth.can_moderate() {
            return Err(AuthError::NotModerator);
        }
        Ok(RequireModerator(auth))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(auth) = RequireAuth::from_request_parts(parts, state).await?;
        if !auth.is_admin() {
            return Err(AuthError::NotAdmin);
        }
        Ok(RequireAdmin(auth))
    }
}
