//! Storefront backend.
//!
//! Catalog browsing, per-user carts and wishlists, transactional checkout
//! with atomic stock reservation, an append-only inventory ledger, and an
//! admin console for order lifecycle and inventory corrections.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
