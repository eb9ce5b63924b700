//! Customer CRUD, restricted to admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use favoritos_core::{CustomerId, Email};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::{Customer, CustomerPatch};
use crate::state::AppState;

use super::Pagination;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route(
            "/customers/{id}",
            get(show).patch(update).delete(delete),
        )
}

#[derive(Debug, Deserialize)]
struct CreateCustomerRequest {
    name: String,
    email: String,
    password: String,
}

async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let email = Email::parse(&payload.email)?;
    let customer = state
        .customers()
        .create(payload.name, email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let (offset, limit) = pagination.clamped();
    let customers = state.customers().list(offset, limit).await?;
    Ok(Json(customers))
}

async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .customers()
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(customer))
}

#[derive(Debug, Deserialize)]
struct UpdateCustomerRequest {
    name: Option<String>,
    email: Option<String>,
}

async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let email = payload.email.as_deref().map(Email::parse).transpose()?;
    let patch = CustomerPatch {
        name: payload.name,
        email,
    };
    let customer = state
        .customers()
        .update(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(customer))
}

async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode, AppError> {
    if state.customers().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
