//! Body extractor that runs schema validation before the handler sees the data.

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::Validate;

/// Like [`axum::Json`], but malformed bodies and failed [`Validate`] checks
/// both come back as a 400 with a field-error list. Oversized bodies and a
/// missing JSON content type keep their 413 and 415.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ApiError::from)?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejection is an [`ApiError`] body.
pub type ApiQuery<T> = WithRejection<Query<T>, ApiError>;

/// Path extractor whose rejection is an [`ApiError`] body.
pub type ApiPath<T> = WithRejection<Path<T>, ApiError>;
