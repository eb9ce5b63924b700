//! Domain models persisted by the repositories.

pub mod account;
pub mod customer;
pub mod favorite;

pub use account::{Account, NewAccount};
pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use favorite::{Favorite, NewFavorite};
