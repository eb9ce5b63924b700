//! Favorites, nested under the owning customer.
//!
//! A customer account can only touch its own list; admins can touch any.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use favoritos_core::{CustomerId, FavoriteId, ProductId};

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Account, Favorite};
use crate::services::TokenError;
use crate::state::AppState;

use super::Pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/customers/{customer_id}/favorites",
            get(list).post(create),
        )
        .route(
            "/customers/{customer_id}/favorites/{favorite_id}",
            get(show).delete(delete),
        )
}

fn ensure_owner_or_admin(account: &Account, customer_id: CustomerId) -> Result<(), AppError> {
    if account.role.is_admin() || account.customer_id == Some(customer_id) {
        Ok(())
    } else {
        Err(TokenError::Forbidden.into())
    }
}

#[derive(Debug, Deserialize)]
struct CreateFavoriteRequest {
    product_id: ProductId,
}

async fn create(
    CurrentUser(account): CurrentUser,
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
    Json(payload): Json<CreateFavoriteRequest>,
) -> Result<(StatusCode, Json<Favorite>), AppError> {
    ensure_owner_or_admin(&account, customer_id)?;
    let favorite = state
        .favorites()
        .add(customer_id, payload.product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn list(
    CurrentUser(account): CurrentUser,
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Favorite>>, AppError> {
    ensure_owner_or_admin(&account, customer_id)?;
    let (offset, limit) = pagination.clamped();
    let favorites = state
        .favorites()
        .list(customer_id, offset, Some(limit))
        .await?;
    Ok(Json(favorites))
}

async fn show(
    CurrentUser(account): CurrentUser,
    State(state): State<AppState>,
    Path((customer_id, favorite_id)): Path<(CustomerId, FavoriteId)>,
) -> Result<Json<Favorite>, AppError> {
    ensure_owner_or_admin(&account, customer_id)?;
    let favorite = state
        .favorites()
        .get(customer_id, favorite_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(favorite))
}

async fn delete(
    CurrentUser(account): CurrentUser,
    State(state): State<AppState>,
    Path((customer_id, favorite_id)): Path<(CustomerId, FavoriteId)>,
) -> Result<StatusCode, AppError> {
    ensure_owner_or_admin(&account, customer_id)?;
    if state.favorites().remove(customer_id, favorite_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
