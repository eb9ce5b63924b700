//! Favorites: bookmarking catalog products per customer.

use std::sync::Arc;

use tracing::info;

use favoritos_core::{CustomerId, FavoriteId, ProductId};

use crate::db::{CustomerStore, FavoriteStore, RepositoryError};
use crate::models::{Favorite, NewFavorite};

use super::catalog::{CatalogError, ProductCatalog};

#[derive(Debug, thiserror::Error)]
pub enum FavoriteServiceError {
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("product {product_id} is already in customer {customer_id}'s favorites")]
    AlreadyFavorited {
        customer_id: CustomerId,
        product_id: ProductId,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct FavoriteService {
    customers: Arc<dyn CustomerStore>,
    favorites: Arc<dyn FavoriteStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl FavoriteService {
    #[must_use]
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        favorites: Arc<dyn FavoriteStore>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            customers,
            favorites,
            catalog,
        }
    }

    /// Validates the product against the live catalog and stores a snapshot
    /// of it. Catalog failures propagate unchanged, so a flaky catalog never
    /// produces a favorite with made-up data.
    pub async fn add(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Favorite, FavoriteServiceError> {
        self.ensure_customer(customer_id).await?;
        if self
            .favorites
            .find_by_customer_product(customer_id, product_id)
            .await?
            .is_some()
        {
            return Err(FavoriteServiceError::AlreadyFavorited {
                customer_id,
                product_id,
            });
        }

        let product = self.catalog.get_product(product_id).await?;
        let favorite = self
            .favorites
            .create(NewFavorite {
                customer_id,
                product_id,
                title: product.title,
                image: product.image,
                price: product.price,
                review: product.description.unwrap_or_default(),
            })
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => FavoriteServiceError::AlreadyFavorited {
                    customer_id,
                    product_id,
                },
                other => other.into(),
            })?;

        info!(customer_id = %customer_id, product_id = %product_id, "favorite added");
        Ok(favorite)
    }

    /// Lists a customer's favorites. Page size limits are a transport
    /// concern; callers that want the whole list pass `None`.
    pub async fn list(
        &self,
        customer_id: CustomerId,
        offset: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Favorite>, FavoriteServiceError> {
        self.ensure_customer(customer_id).await?;
        Ok(self
            .favorites
            .list_by_customer(customer_id, offset, limit.unwrap_or(i64::MAX))
            .await?)
    }

    /// Fetches one favorite, scoped to the owning customer. A favorite that
    /// exists but belongs to someone else reads as absent.
    pub async fn get(
        &self,
        customer_id: CustomerId,
        favorite_id: FavoriteId,
    ) -> Result<Option<Favorite>, FavoriteServiceError> {
        self.ensure_customer(customer_id).await?;
        let favorite = self
            .favorites
            .find_by_id(favorite_id)
            .await?
            .filter(|favorite| favorite.customer_id == customer_id);
        Ok(favorite)
    }

    /// Removes a favorite, scoped to the owning customer. Returns `false`
    /// when it does not exist or belongs to another customer.
    pub async fn remove(
        &self,
        customer_id: CustomerId,
        favorite_id: FavoriteId,
    ) -> Result<bool, FavoriteServiceError> {
        self.ensure_customer(customer_id).await?;
        let Some(favorite) = self
            .favorites
            .find_by_id(favorite_id)
            .await?
            .filter(|favorite| favorite.customer_id == customer_id)
        else {
            return Ok(false);
        };

        let deleted = self.favorites.delete(favorite.id).await?;
        if deleted {
            info!(customer_id = %customer_id, favorite_id = %favorite_id, "favorite removed");
        }
        Ok(deleted)
    }

    async fn ensure_customer(&self, id: CustomerId) -> Result<(), FavoriteServiceError> {
        if self.customers.find_by_id(id).await?.is_none() {
            return Err(FavoriteServiceError::CustomerNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use crate::db::memory::MemoryStore;
    use crate::models::Customer;
    use crate::services::catalog::CatalogProduct;
    use crate::services::identity::tests::service as identity_service;

    use super::*;

    /// Catalog stub with a fixed product set.
    #[derive(Default)]
    struct StubCatalog {
        products: HashMap<i32, CatalogProduct>,
        unavailable: bool,
    }

    impl StubCatalog {
        fn with_product(mut self, id: i32, title: &str, description: Option<&str>) -> Self {
            self.products.insert(
                id,
                CatalogProduct {
                    id: ProductId::new(id),
                    title: title.to_owned(),
                    image: format!("https://catalog.test/img/{id}.jpg"),
                    price: Decimal::new(1099, 2),
                    description: description.map(str::to_owned),
                    category: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl ProductCatalog for StubCatalog {
        async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
            if self.unavailable {
                return Err(CatalogError::Unavailable("connection refused".to_owned()));
            }
            self.products
                .get(&id.as_i32())
                .cloned()
                .ok_or(CatalogError::NotFound(id))
        }

        async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
            if self.unavailable {
                return Err(CatalogError::Unavailable("connection refused".to_owned()));
            }
            Ok(self.products.values().cloned().collect())
        }
    }

    fn service(store: &Arc<MemoryStore>, catalog: StubCatalog) -> FavoriteService {
        FavoriteService::new(store.clone(), store.clone(), Arc::new(catalog))
    }

    async fn seed_customer(store: &Arc<MemoryStore>) -> Customer {
        let account = identity_service(store)
            .register_self_service(
                favoritos_core::Email::parse("ana@example.com").unwrap(),
                "hunter2hunter2",
            )
            .await
            .unwrap();
        CustomerStore::find_by_id(store.as_ref(), account.customer_id.unwrap())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_snapshots_catalog_data() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(
            &store,
            StubCatalog::default().with_product(1, "Backpack", Some("Fits laptops")),
        );

        let favorite = favorites.add(customer.id, ProductId::new(1)).await.unwrap();
        assert_eq!(favorite.title, "Backpack");
        assert_eq!(favorite.review, "Fits laptops");
        assert_eq!(favorite.price, Decimal::new(1099, 2));
    }

    #[tokio::test]
    async fn test_add_defaults_missing_description_to_empty() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(&store, StubCatalog::default().with_product(1, "Mug", None));

        let favorite = favorites.add(customer.id, ProductId::new(1)).await.unwrap();
        assert_eq!(favorite.review, "");
    }

    #[tokio::test]
    async fn test_add_then_get_returns_the_same_record() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let mut catalog = StubCatalog::default().with_product(55, "X", None);
        if let Some(product) = catalog.products.get_mut(&55) {
            product.price = Decimal::new(105, 1);
            product.image = "u".to_owned();
        }
        let favorites = service(&store, catalog);

        let added = favorites.add(customer.id, ProductId::new(55)).await.unwrap();
        assert_eq!(added.price.to_string(), "10.5");
        assert_eq!(added.review, "");

        let fetched = favorites
            .get(customer.id, added.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, added.id);
        assert_eq!(fetched.title, added.title);
        assert_eq!(fetched.image, added.image);
        assert_eq!(fetched.price, added.price);
        assert_eq!(fetched.review, added.review);
    }

    #[tokio::test]
    async fn test_add_same_product_twice_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(&store, StubCatalog::default().with_product(1, "Mug", None));

        favorites.add(customer.id, ProductId::new(1)).await.unwrap();
        let err = favorites
            .add(customer.id, ProductId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteServiceError::AlreadyFavorited { .. }));
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(&store, StubCatalog::default());

        let err = favorites
            .add(customer.id, ProductId::new(42))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FavoriteServiceError::Catalog(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_with_unreachable_catalog_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(
            &store,
            StubCatalog {
                unavailable: true,
                ..StubCatalog::default()
            },
        );

        let err = favorites
            .add(customer.id, ProductId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FavoriteServiceError::Catalog(CatalogError::Unavailable(_))
        ));
        let listed = store.list_by_customer(customer.id, 0, 100).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_list_without_limit_returns_everything() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let catalog = StubCatalog::default()
            .with_product(1, "Mug", None)
            .with_product(2, "Backpack", None)
            .with_product(3, "Lamp", None);
        let favorites = service(&store, catalog);

        for product_id in 1..=3 {
            favorites
                .add(customer.id, ProductId::new(product_id))
                .await
                .unwrap();
        }

        let all = favorites.list(customer.id, 0, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let page = favorites.list(customer.id, 0, Some(2)).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let favorites = service(&store, StubCatalog::default().with_product(1, "Mug", None));

        let err = favorites
            .add(CustomerId::new(99), ProductId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteServiceError::CustomerNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_and_remove_are_owner_scoped() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_customer(&store).await;
        let favorites = service(&store, StubCatalog::default().with_product(1, "Mug", None));
        let favorite = favorites.add(customer.id, ProductId::new(1)).await.unwrap();

        let other = identity_service(&store)
            .register_self_service(
                favoritos_core::Email::parse("bob@example.com").unwrap(),
                "hunter2hunter2",
            )
            .await
            .unwrap();
        let other_id = other.customer_id.unwrap();

        assert!(favorites.get(other_id, favorite.id).await.unwrap().is_none());
        assert!(!favorites.remove(other_id, favorite.id).await.unwrap());

        assert!(favorites
            .get(customer.id, favorite.id)
            .await
            .unwrap()
            .is_some());
        assert!(favorites.remove(customer.id, favorite.id).await.unwrap());
        assert!(!favorites.remove(customer.id, favorite.id).await.unwrap());
    }
}
