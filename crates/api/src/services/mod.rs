//! Business logic, layered over the repository ports in [`crate::db`].

pub mod catalog;
pub mod customers;
pub mod favorites;
pub mod identity;
pub mod password;
pub mod token;

pub use catalog::{CatalogClient, CatalogError, CatalogProduct, ProductCatalog};
pub use customers::{CustomerService, CustomerServiceError};
pub use favorites::{FavoriteService, FavoriteServiceError};
pub use identity::{IdentityService, IdentityServiceError};
pub use password::{Argon2Credentials, CredentialError, CredentialStore};
pub use token::{Claims, SignatureVerifier, TokenError, TokenIssuer};
