//! Account model: the login identity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use favoritos_core::{AccountId, CustomerId, Email, Role};

/// A login identity.
///
/// Accounts and customers are independent aggregates; the nullable
/// `customer_id` is the only link between them, and it is unique — at most
/// one account per customer. Admin-created accounts may have no customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    /// Stored credential; never serialized into responses.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub hashed_password: String,
    pub role: Role,
}
