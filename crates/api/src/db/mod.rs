//! Persistence layer: pool construction, repository ports, and their
//! Postgres implementations.
//!
//! Services depend on the `*Store` traits rather than on `PgPool` directly,
//! so unit tests can swap in the in-memory store from [`memory`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use favoritos_core::{AccountId, CustomerId, Email, FavoriteId, ProductId};

use crate::models::{
    Account, Customer, CustomerPatch, Favorite, NewAccount, NewCustomer, NewFavorite,
};

pub mod accounts;
pub mod customers;
pub mod favorites;

#[cfg(test)]
pub mod memory;

pub use accounts::PgAccountStore;
pub use customers::PgCustomerStore;
pub use favorites::PgFavoriteStore;

/// Builds the shared connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed domain validation on the way out.
    #[error("stored data is invalid: {0}")]
    DataCorruption(String),

    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Whether the error is a Postgres unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Repository port for login accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Account>, RepositoryError>;

    /// Creates a standalone account with no customer link.
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Creates a customer and its linked account in one transaction.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn create_with_customer(
        &self,
        account: NewAccount,
        customer: NewCustomer,
    ) -> Result<(Account, Customer), RepositoryError>;

    async fn update_email(&self, id: AccountId, email: &Email) -> Result<(), RepositoryError>;
}

/// Repository port for customers.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError>;

    /// Lists customers ordered by id, for stable pagination.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Customer>, RepositoryError>;

    /// Applies a partial update. When the patch changes the email, the linked
    /// account's email (if any) is updated in the same transaction.
    ///
    /// Returns `None` when the customer does not exist.
    async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Deletes a customer, its favorites, and optionally its linked account,
    /// all in one transaction. Returns `false` when the customer was absent.
    async fn delete_with_account(
        &self,
        id: CustomerId,
        account_id: Option<AccountId>,
    ) -> Result<bool, RepositoryError>;
}

/// Repository port for favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn find_by_id(&self, id: FavoriteId) -> Result<Option<Favorite>, RepositoryError>;

    async fn find_by_customer_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<Favorite>, RepositoryError>;

    /// Lists a customer's favorites ordered by id.
    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Favorite>, RepositoryError>;

    /// Inserts a favorite. A duplicate (customer, product) pair surfaces as
    /// [`RepositoryError::Conflict`].
    async fn create(&self, favorite: NewFavorite) -> Result<Favorite, RepositoryError>;

    /// Deletes a favorite. Returns `false` when it was absent.
    async fn delete(&self, id: FavoriteId) -> Result<bool, RepositoryError>;
}
