//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// URL prefix the upload directory is published under.
pub const IMAGE_URL_PREFIX: &str = "/static/images/";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Public URL for a stored product image reference.
///
/// Usage in templates: `{{ product.image_url|image_src }}`
#[askama::filter_fn]
pub fn image_src(image_url: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{IMAGE_URL_PREFIX}{image_url}"))
}
