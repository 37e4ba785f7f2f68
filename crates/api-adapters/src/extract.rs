//! Request extractors for authenticated and admin callers.
//!
//! The bearer token resolves to a freshly fetched user on every request, so
//! blocks take effect immediately and nothing stale rides in the token.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use domains::{AppError, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Any signed-in, non-blocked account.
pub struct AuthUser(pub User);

/// A signed-in account that passes the admin policy.
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError(AppError::Unauthorized("missing bearer token".into())))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = state.accounts.authenticate(token).await?;
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !state.admin.is_admin(&user) {
            return Err(ApiError(AppError::Forbidden(
                "admin privileges required".into(),
            )));
        }
        Ok(Self(user))
    }
}
