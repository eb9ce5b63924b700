//! Account registration and authentication.

use std::sync::Arc;

use tracing::info;

use favoritos_core::{AccountId, Email, Role};

use crate::db::{AccountStore, CustomerStore, RepositoryError};
use crate::models::{Account, NewAccount, NewCustomer};

use super::password::{CredentialError, CredentialStore};

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// A social login matched an existing account that is not a customer.
    #[error("this email belongs to a non-customer account")]
    SocialRoleMismatch,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Registration and login, over the account and customer stores.
#[derive(Clone)]
pub struct IdentityService {
    accounts: Arc<dyn AccountStore>,
    customers: Arc<dyn CustomerStore>,
    credentials: Arc<dyn CredentialStore>,
}

impl IdentityService {
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

    /// Self-service sign-up: creates a customer-role account together with
    /// its customer record. The customer's initial name is the email's local
    /// part.
    pub async fn register_self_service(
        &self,
        email: Email,
        password: &str,
    ) -> Result<Account, IdentityServiceError> {
        check_password(password)?;
        self.ensure_email_free(&email).await?;

        let hashed_password = self.credentials.hash(password)?;
        let name = email.local_part().to_owned();
        let (account, _customer) = self
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

        info!(account_id = %account.id, "registered self-service account");
        Ok(account)
    }

    /// Admin-driven account creation. The account gets the given role and no
    /// customer link; linked customers come from the customer CRUD instead.
    pub async fn register_by_admin(
        &self,
        email: Email,
        password: &str,
        role: Role,
    ) -> Result<Account, IdentityServiceError> {
        check_password(password)?;
        self.ensure_email_free(&email).await?;

        let hashed_password = self.credentials.hash(password)?;
        let account = self
            .accounts
            .create(NewAccount {
                email,
                hashed_password,
                role,
            })
            .await
            .map_err(conflict_as_email_taken)?;

        info!(account_id = %account.id, role = %account.role, "account created by admin");
        Ok(account)
    }

    /// Sign-in via an external identity provider.
    ///
    /// When the email is unknown, provisions a customer-role account whose
    /// stored credential is the provider's opaque subject, which can never
    /// verify as a password. When it is known, the existing account is reused
    /// and the customer's name is synced when the provider profile differs; a match
    /// against a non-customer account is rejected.
    pub async fn register_or_link_social(
        &self,
        email: Email,
        name: &str,
        provider_subject: &str,
    ) -> Result<Account, IdentityServiceError> {
        if let Some(account) = self.accounts.find_by_email(&email).await? {
            if !matches!(account.role, Role::Customer) {
                return Err(IdentityServiceError::SocialRoleMismatch);
            }
            if let Some(customer_id) = account.customer_id {
                let customer = self.customers.find_by_id(customer_id).await?;
                // Only write when the provider profile actually renamed the
                // customer, so a plain relogin does not touch the row.
                if customer.is_some_and(|customer| customer.name != name) {
                    self.customers
                        .update(
                            customer_id,
                            crate::models::CustomerPatch {
                                name: Some(name.to_owned()),
                                email: None,
                            },
                        )
                        .await?;
                }
            }
            return Ok(account);
        }

        let (account, _customer) = self
            .accounts
            .create_with_customer(
                NewAccount {
                    email: email.clone(),
                    hashed_password: format!("social:{provider_subject}"),
                    role: Role::Customer,
                },
                NewCustomer {
                    name: name.to_owned(),
                    email,
                },
            )
            .await
            .map_err(conflict_as_email_taken)?;

        info!(account_id = %account.id, "provisioned account from social login");
        Ok(account)
    }

    /// Checks credentials. Returns `Ok(None)` for an unknown email, an
    /// unparseable email, or a wrong password, so callers cannot tell the
    /// cases apart.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, IdentityServiceError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let Some(account) = self.accounts.find_by_email(&email).await? else {
            return Ok(None);
        };
        if self.credentials.verify(password, &account.hashed_password) {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    pub async fn account_by_id(
        &self,
        id: AccountId,
    ) -> Result<Option<Account>, IdentityServiceError> {
        Ok(self.accounts.find_by_id(id).await?)
    }

    async fn ensure_email_free(&self, email: &Email) -> Result<(), IdentityServiceError> {
        if self.accounts.find_by_email(email).await?.is_some()
            || self.customers.find_by_email(email).await?.is_some()
        {
            return Err(IdentityServiceError::EmailTaken);
        }
        Ok(())
    }
}

fn check_password(password: &str) -> Result<(), IdentityServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(IdentityServiceError::WeakPassword);
    }
    Ok(())
}

/// The unique index can still fire under a concurrent registration; map it to
/// the same error as the pre-check.
fn conflict_as_email_taken(err: RepositoryError) -> IdentityServiceError {
    match err {
        RepositoryError::Conflict(_) => IdentityServiceError::EmailTaken,
        other => other.into(),
    }
}
