//! Shared application state.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::{PgAccountStore, PgCustomerStore, PgFavoriteStore};
use crate::services::{
    Argon2Credentials, CatalogClient, CustomerService, FavoriteService, IdentityService,
    ProductCatalog, SignatureVerifier, TokenIssuer,
};

/// Handler state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    identity: IdentityService,
    customers: CustomerService,
    favorites: FavoriteService,
    catalog: Arc<dyn ProductCatalog>,
    tokens: TokenIssuer,
    social_gate: SignatureVerifier,
}

impl AppState {
    /// Wires repositories and services from the pool and config.
    #[must_use]
    pub fn new(config: &AppConfig, pool: PgPool, http: reqwest::Client) -> Self {
        let accounts = Arc::new(PgAccountStore::new(pool.clone()));
        let customers = Arc::new(PgCustomerStore::new(pool.clone()));
        let favorites = Arc::new(PgFavoriteStore::new(pool.clone()));
        let credentials = Arc::new(Argon2Credentials);
        let catalog: Arc<dyn ProductCatalog> =
            Arc::new(CatalogClient::new(http, config.catalog_base_url.clone()));

        let identity =
            IdentityService::new(accounts.clone(), customers.clone(), credentials.clone());
        let customer_service =
            CustomerService::new(accounts.clone(), customers.clone(), credentials);
        let favorite_service =
            FavoriteService::new(customers.clone(), favorites, catalog.clone());

        let tokens = TokenIssuer::new(
            config.jwt_secret.clone(),
            Duration::minutes(config.token_ttl_minutes),
        );
        let social_gate = SignatureVerifier::new(config.social_gateway_secret.clone());

        Self {
            inner: Arc::new(AppStateInner {
                pool,
                identity,
                customers: customer_service,
                favorites: favorite_service,
                catalog,
                tokens,
                social_gate,
            }),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        &self.inner.identity
    }

    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoriteService {
        &self.inner.favorites
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn ProductCatalog> {
        &self.inner.catalog
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    #[must_use]
    pub fn social_gate(&self) -> &SignatureVerifier {
        &self.inner.social_gate
    }
}
