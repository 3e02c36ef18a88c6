//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the row types the
//! repositories decode.

pub mod product;
pub mod session;
pub mod user;

pub use product::{CartLine, Product, ProductInput, ProductInputError};
pub use session::{CurrentUser, FlashLevel, FlashMessage, keys as session_keys};
pub use user::User;
