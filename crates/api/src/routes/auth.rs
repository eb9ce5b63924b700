//! Registration, login, and session introspection.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use favoritos_core::{CustomerId, Email, Role};

use crate::error::AppError;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::Account;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/users", post(create_user))
        .route("/auth/login", post(login))
        .route("/auth/social", post(social_login))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
}

/// Self-service sign-up; open to anyone.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let email = Email::parse(&payload.email)?;
    let account = state
        .identity()
        .register_self_service(email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: String,
    password: String,
    #[serde(default)]
    role: Option<Role>,
}

/// Admin-only account creation, for provisioning further admins.
async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let email = Email::parse(&payload.email)?;
    let role = payload.role.unwrap_or(Role::Customer);
    let account = state
        .identity()
        .register_by_admin(email, &payload.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    role: Role,
    customer_id: Option<CustomerId>,
}

impl TokenResponse {
    fn for_account(state: &AppState, account: &Account) -> Result<Self, AppError> {
        let access_token =
            state
                .tokens()
                .issue(account.id, account.role, account.customer_id)?;
        Ok(Self {
            access_token,
            token_type: "bearer",
            role: account.role,
            customer_id: account.customer_id,
        })
    }
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let account = state
        .identity()
        .authenticate(&payload.email, &payload.password)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(TokenResponse::for_account(&state, &account)?))
}

/// Header carrying the OAuth gateway's HMAC-SHA256 signature of the body.
const GATEWAY_SIGNATURE_HEADER: &str = "x-gateway-signature";

#[derive(Debug, Deserialize)]
struct SocialLoginRequest {
    email: String,
    name: String,
    /// Stable subject from the identity provider.
    subject: String,
}

/// Completes a sign-in that the OAuth gateway has already verified with the
/// provider. The gateway signs the raw body with the shared gateway secret;
/// an unsigned or mis-signed request is refused before any account lookup,
/// so this endpoint cannot be used to mint tokens for arbitrary emails.
async fn social_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenResponse>, AppError> {
    let signature = headers
        .get(GATEWAY_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    if !state.social_gate().verify(&body, signature) {
        return Err(AppError::Unauthorized);
    }

    let payload: SocialLoginRequest =
        serde_json::from_slice(&body).map_err(|err| AppError::Validation(err.to_string()))?;
    let email = Email::parse(&payload.email)?;
    let account = state
        .identity()
        .register_or_link_social(email, &payload.name, &payload.subject)
        .await?;
    Ok(Json(TokenResponse::for_account(&state, &account)?))
}

async fn me(CurrentUser(account): CurrentUser) -> Json<Account> {
    Json(account)
}
