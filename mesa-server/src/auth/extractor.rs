//! CurrentUser extractor
//!
//! Reuses the identity inserted by [`super::require_auth`]; otherwise
//! authenticates from the `Authorization` header itself.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::CurrentUser;
use crate::auth::middleware::{authenticate, bearer_token};
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers)?;
        let user = authenticate(state, token).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
