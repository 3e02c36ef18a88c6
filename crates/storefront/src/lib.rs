//! Shopfront storefront library.
//!
//! Catalog, accounts, carts, and product administration over `PostgreSQL`.
//! The binary in `main.rs` wires this up; the integration tests build the same
//! router with an in-memory session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
