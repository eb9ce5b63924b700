//! Favorite model: a customer's bookmarked catalog product.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use favoritos_core::{CustomerId, FavoriteId, ProductId};

/// A favorited product, carrying a snapshot of the catalog data taken at
/// creation time. The (customer_id, product_id) pair is unique.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: FavoriteId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    /// Catalog description; empty string when the catalog had none.
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for creating a favorite.
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    pub review: String,
}
