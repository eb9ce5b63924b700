//! Customer management, the admin-facing CRUD surface.

use std::sync::Arc;

use tracing::info;

use favoritos_core::{CustomerId, Email, Role};

use crate::db::{AccountStore, CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerPatch, NewAccount, NewCustomer};

use super::identity::MIN_PASSWORD_LENGTH;
use super::password::{CredentialError, CredentialStore};

#[derive(Debug, thiserror::Error)]
pub enum CustomerServiceError {
    #[error("a customer with this email already exists")]
    EmailTaken,

    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Clone)]
pub struct CustomerService {
    accounts: Arc<dyn AccountStore>,
    customers: Arc<dyn CustomerStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl CustomerService {
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        customers: Arc<dyn CustomerStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            accounts,
            customers,
            credentials,
        }
    }

    /// Creates a customer together with its login account, atomically.
    pub async fn create(
        &self,
        name: String,
        email: Email,
        password: &str,
    ) -> Result<Customer, CustomerServiceError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CustomerServiceError::WeakPassword);
        }
        if self.customers.find_by_email(&email).await?.is_some()
            || self.accounts.find_by_email(&email).await?.is_some()
        {
            return Err(CustomerServiceError::EmailTaken);
        }

        let hashed_password = self.credentials.hash(password)?;
        let (_account, customer) = self
            .accounts
            .create_with_customer(
                NewAccount {
                    email: email.clone(),
                    hashed_password,
                    role: Role::Customer,
                },
                NewCustomer { name, email },
            )
            .await
            .map_err(conflict_as_email_taken)?;

        info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub async fn list(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Customer>, CustomerServiceError> {
        Ok(self.customers.list(offset, limit).await?)
    }

    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, CustomerServiceError> {
        Ok(self.customers.find_by_id(id).await?)
    }

    /// Applies a partial update; an email change also moves the linked login
    /// account to the new address.
    pub async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, CustomerServiceError> {
        if patch.is_empty() {
            return Ok(self.customers.find_by_id(id).await?);
        }
        if let Some(email) = &patch.email
            && let Some(existing) = self.customers.find_by_email(email).await?
            && existing.id != id
        {
            return Err(CustomerServiceError::EmailTaken);
        }

        Ok(self
            .customers
            .update(id, patch)
            .await
            .map_err(conflict_as_email_taken)?)
    }

    /// Deletes a customer along with its favorites and login account.
    /// Returns `false` when the customer does not exist.
    pub async fn delete(&self, id: CustomerId) -> Result<bool, CustomerServiceError> {
        if self.customers.find_by_id(id).await?.is_none() {
            return Ok(false);
        }
        let account_id = self
            .accounts
            .find_by_customer(id)
            .await?
            .map(|account| account.id);

        let deleted = self.customers.delete_with_account(id, account_id).await?;
        if deleted {
            info!(customer_id = %id, "customer deleted");
        }
        Ok(deleted)
    }
}

fn conflict_as_email_taken(err: RepositoryError) -> CustomerServiceError {
    match err {
        RepositoryError::Conflict(_) => CustomerServiceError::EmailTaken,
        other => other.into(),
    }
}
