//! Business logic services for the storefront.
//!
//! - `auth` - Registration and password login
//! - `images` - Product image uploads on local disk

pub mod auth;
pub mod images;

pub use auth::{AuthError, AuthService};
pub use images::ImageStore;
