//! In-memory store used by unit tests in place of Postgres.
//!
//! Mirrors the uniqueness rules the schema enforces: account email, customer
//! email, and the (customer, product) favorite pair.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use favoritos_core::{AccountId, CustomerId, Email, FavoriteId, ProductId};

use crate::models::{
    Account, Customer, CustomerPatch, Favorite, NewAccount, NewCustomer, NewFavorite,
};

use super::{AccountStore, CustomerStore, FavoriteStore, RepositoryError};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    customers: Vec<Customer>,
    favorites: Vec<Favorite>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// When set, the next account insert fails with a database error. Used to
    /// check that paired customer/account writes leave no partial state.
    fail_next_account_insert: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_account_insert(&self) {
        self.fail_next_account_insert.store(true, Ordering::SeqCst);
    }

    pub fn customer_count(&self) -> usize {
        self.inner.lock().unwrap().customers.len()
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }

    fn take_failure(&self) -> bool {
        self.fail_next_account_insert.swap(false, Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.iter().find(|a| a.email == *email).cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.customer_id == Some(customer_id))
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        if self.take_failure() {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("account email already taken".to_owned()));
        }
        let id = inner.next_id();
        let account = Account {
            id: AccountId::from(id),
            email: account.email,
            hashed_password: account.hashed_password,
            role: account.role,
            customer_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.accounts.push(account.clone());
        Ok(account)
    }

    async fn create_with_customer(
        &self,
        account: NewAccount,
        customer: NewCustomer,
    ) -> Result<(Account, Customer), RepositoryError> {
        // Single lock scope, so either both records land or neither does.
        let fail = self.take_failure();
        let mut inner = self.inner.lock().unwrap();
        if inner.customers.iter().any(|c| c.email == customer.email) {
            return Err(RepositoryError::Conflict("customer email already taken".to_owned()));
        }
        if inner.accounts.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("account email already taken".to_owned()));
        }
        if fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        let customer_id = inner.next_id();
        let customer = Customer {
            id: CustomerId::from(customer_id),
            name: customer.name,
            email: customer.email,
            created_at: Utc::now(),
            updated_at: None,
        };
        let account_id = inner.next_id();
        let account = Account {
            id: AccountId::from(account_id),
            email: account.email,
            hashed_password: account.hashed_password,
            role: account.role,
            customer_id: Some(customer.id),
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.customers.push(customer.clone());
        inner.accounts.push(account.clone());
        Ok((account, customer))
    }

    async fn update_email(&self, id: AccountId, email: &Email) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.iter().any(|a| a.id != id && a.email == *email) {
            return Err(RepositoryError::Conflict("account email already taken".to_owned()));
        }
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        account.email = email.clone();
        account.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.customers.iter().find(|c| c.email == *email).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Customer>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut customers = inner.customers.clone();
        customers.sort_by_key(|c| c.id);
        Ok(customers
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(email) = &patch.email
            && inner.customers.iter().any(|c| c.id != id && c.email == *email)
        {
            return Err(RepositoryError::Conflict("customer email already taken".to_owned()));
        }
        let Some(customer) = inner.customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            customer.name = name;
        }
        if let Some(email) = &patch.email {
            customer.email = email.clone();
        }
        customer.updated_at = Some(Utc::now());
        let updated = customer.clone();
        if let Some(email) = &patch.email
            && let Some(account) = inner
                .accounts
                .iter_mut()
                .find(|a| a.customer_id == Some(id))
        {
            account.email = email.clone();
            account.updated_at = Some(Utc::now());
        }
        Ok(Some(updated))
    }

    async fn delete_with_account(
        &self,
        id: CustomerId,
        account_id: Option<AccountId>,
    ) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        inner.favorites.retain(|f| f.customer_id != id);
        if let Some(account_id) = account_id {
            inner.accounts.retain(|a| a.id != account_id);
        }
        let before = inner.customers.len();
        inner.customers.retain(|c| c.id != id);
        Ok(inner.customers.len() < before)
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn find_by_id(&self, id: FavoriteId) -> Result<Option<Favorite>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.favorites.iter().find(|f| f.id == id).cloned())
    }

    async fn find_by_customer_product(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .favorites
            .iter()
            .find(|f| f.customer_id == customer_id && f.product_id == product_id)
            .cloned())
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Favorite>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let mut favorites: Vec<_> = inner
            .favorites
            .iter()
            .filter(|f| f.customer_id == customer_id)
            .cloned()
            .collect();
        favorites.sort_by_key(|f| f.id);
        Ok(favorites
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn create(&self, favorite: NewFavorite) -> Result<Favorite, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .favorites
            .iter()
            .any(|f| f.customer_id == favorite.customer_id && f.product_id == favorite.product_id)
        {
            return Err(RepositoryError::Conflict(format!(
                "product {} already favorited by customer {}",
                favorite.product_id, favorite.customer_id
            )));
        }
        let id = inner.next_id();
        let favorite = Favorite {
            id: FavoriteId::from(id),
            customer_id: favorite.customer_id,
            product_id: favorite.product_id,
            title: favorite.title,
            image: favorite.image,
            price: favorite.price,
            review: favorite.review,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn delete(&self, id: FavoriteId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.favorites.len();
        inner.favorites.retain(|f| f.id != id);
        Ok(inner.favorites.len() < before)
    }
}
