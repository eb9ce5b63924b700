//! Postgres-backed account repository.

use async_trait::async_trait;
use sqlx::PgPool;

use favoritos_core::{AccountId, CustomerId, Email};

use crate::models::{Account, Customer, NewAccount, NewCustomer};

use super::{AccountStore, RepositoryError, is_unique_violation};

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (email, hashed_password, role) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&account.email)
        .bind(&account.hashed_password)
        .bind(account.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict(format!("account email {} already taken", account.email))
            } else {
                err.into()
            }
        })
    }

    async fn create_with_customer(
        &self,
        account: NewAccount,
        customer: NewCustomer,
    ) -> Result<(Account, Customer), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING *",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("customer email already taken".to_owned())
            } else {
                err.into()
            }
        })?;

        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (email, hashed_password, role, customer_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&account.email)
        .bind(&account.hashed_password)
        .bind(account.role)
        .bind(customer.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("account email already taken".to_owned())
            } else {
                err.into()
            }
        })?;

        tx.commit().await?;
        Ok((account, customer))
    }

    async fn update_email(&self, id: AccountId, email: &Email) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE accounts SET email = $1, updated_at = now() WHERE id = $2")
                .bind(email)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|err| {
                    if is_unique_violation(&err) {
                        RepositoryError::Conflict(format!("account email {email} already taken"))
                    } else {
                        RepositoryError::from(err)
                    }
                })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
