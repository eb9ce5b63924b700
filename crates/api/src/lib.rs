//! Favoritos API - customer and favorites backend.
//!
//! Accounts authenticate with signed bearer tokens; customers are managed by
//! admins; favorites reference products in an external catalog and store a
//! snapshot of the catalog data.
//!
//! The binary lives in `main.rs`; everything here is a library so the cli
//! crate can reuse the config, pool, and services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
