//! Read-through proxy to the product catalog, for browsing before
//! favoriting. Requires a session so the catalog is not exposed anonymously.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use favoritos_core::ProductId;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::CatalogProduct;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list))
        .route("/products/{id}", get(show))
}

async fn list(
    CurrentUser(_account): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogProduct>>, AppError> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products))
}

async fn show(
    CurrentUser(_account): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<CatalogProduct>, AppError> {
    let product = state.catalog().get_product(id).await?;
    Ok(Json(product))
}
