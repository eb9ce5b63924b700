//! Postgres-backed favorites repository.

use async_trait::async_trait;
use sqlx::PgPool;

use favoritos_core::{CustomerId, FavoriteId, ProductId};

use crate::models::{Favorite, NewFavorite};

use super::{FavoriteStore, RepositoryError, is_unique_violation};

#[derive(Debug, Clone)]
pub struct PgFavoriteStore {
    pool: PgPool,
}

impl PgFavoriteStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn find_by_id(&self, id: FavoriteId) -> Result<Option<Favorite>, RepositoryError> {
        let favorite = sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(favorite)
    }

    async fn find_by_customer_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let favorite = sqlx::query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE customer_id = $1 AND product_id = $2",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(favorite)
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let favorites = sqlx::query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE customer_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
        )
        .bind(customer_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(favorites)
    }

    async fn create(&self, favorite: NewFavorite) -> Result<Favorite, RepositoryError> {
        sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (customer_id, product_id, title, image, price, review) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(favorite.customer_id)
        .bind(favorite.product_id)
        .bind(&favorite.title)
        .bind(&favorite.image)
        .bind(favorite.price)
        .bind(&favorite.review)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict(format!(
                    "product {} already favorited by customer {}",
                    favorite.product_id, favorite.customer_id
                ))
            } else {
                err.into()
            }
        })
    }

    async fn delete(&self, id: FavoriteId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
