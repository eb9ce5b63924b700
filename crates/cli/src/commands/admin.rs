//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! favoritos-cli admin create -e admin@example.com -p "a strong password"
//! ```
//!
//! # Environment Variables
//!
//! - `FAVORITOS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use favoritos_api::db::{PgAccountStore, PgCustomerStore};
use favoritos_api::services::{Argon2Credentials, IdentityService, IdentityServiceError};
use favoritos_core::{Email, EmailError, Role};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Account creation failed.
    #[error("Account creation failed: {0}")]
    Identity(#[from] IdentityServiceError),
}

/// Create a new admin account.
///
/// # Returns
///
/// The ID of the created account.
pub async fn create_admin(email: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;

    let database_url = std::env::var("FAVORITOS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("FAVORITOS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin account: {}", email);

    let identity = IdentityService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgCustomerStore::new(pool)),
        Arc::new(Argon2Credentials),
    );
    let account = identity
        .register_by_admin(email, password, Role::Admin)
        .await?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );

    Ok(account.id.as_i32())
}
