//! Postgres-backed customer repository.

use async_trait::async_trait;
use sqlx::PgPool;

use favoritos_core::{AccountId, CustomerId, Email};

use crate::models::{Customer, CustomerPatch};

use super::{CustomerStore, RepositoryError, is_unique_violation};

#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET \
                 name = COALESCE($1, name), \
                 email = COALESCE($2, email), \
                 updated_at = now() \
             WHERE id = $3 RETURNING *",
        )
        .bind(patch.name.as_deref())
        .bind(patch.email.as_ref())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("customer email already taken".to_owned())
            } else {
                RepositoryError::from(err)
            }
        })?;

        let Some(customer) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        // A customer's login email follows the customer record.
        if let Some(email) = &patch.email {
            sqlx::query(
                "UPDATE accounts SET email = $1, updated_at = now() WHERE customer_id = $2",
            )
            .bind(email)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepositoryError::Conflict("account email already taken".to_owned())
                } else {
                    RepositoryError::from(err)
                }
            })?;
        }

        tx.commit().await?;
        Ok(Some(customer))
    }

    async fn delete_with_account(
        &self,
        id: CustomerId,
        account_id: Option<AccountId>,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM favorites WHERE customer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(account_id) = account_id {
            sqlx::query("DELETE FROM accounts WHERE id = $1")
                .bind(account_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
