//! Current-user extraction.
//!
//! Authentication itself happens upstream (gateway / session middleware);
//! this service trusts the `x-user-id` header it is handed. The extractor
//! only checks presence and shape, ownership checks stay in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ratecraft_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, extracted from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: DbId,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("Missing {USER_ID_HEADER} header")))?;

        let user_id: DbId = header
            .to_str()
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::BadRequest(format!("{USER_ID_HEADER} must be a positive integer"))
            })?;

        Ok(Self { user_id })
    }
}
