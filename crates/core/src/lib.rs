//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - The web application (shop, cart, and catalog admin)
//! - `cli` - Command-line tools for migrations, admin flags, and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, email addresses, prices, and product image paths

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
