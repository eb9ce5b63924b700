//! Request extractors for authentication.
//!
//! Handlers take [`CurrentUser`] or [`RequireAdmin`] as arguments; the token
//! is verified and the account re-fetched, so a token issued before an
//! account was deleted stops working immediately.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::models::Account;
use crate::services::TokenError;
use crate::state::AppState;

/// Any authenticated account.
pub struct CurrentUser(pub Account);

/// An authenticated admin account.
pub struct RequireAdmin(pub Account);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = state.tokens().verify(token)?;
        let account_id = claims.account_id()?;

        let account = state
            .identity()
            .account_by_id(account_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(Self(account))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(account) = CurrentUser::from_request_parts(parts, state).await?;
        if !account.role.is_admin() {
            return Err(TokenError::Forbidden.into());
        }
        Ok(Self(account))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
