//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{DEFAULT_PRODUCT_IMAGE, PRODUCT_IMAGE_DIR, product_image_url, sanitize_filename};
pub use price::{Price, PriceError};
