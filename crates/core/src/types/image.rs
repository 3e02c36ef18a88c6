//! Product image path rules.
//!
//! Product rows store a path relative to the upload root, e.g.
//! `products/widget.jpg`. Products created without an upload point at a shared
//! placeholder.

use unicode_normalization::UnicodeNormalization;

/// Subdirectory of the upload root holding product images.
pub const PRODUCT_IMAGE_DIR: &str = "products";

/// Placeholder image reference for products without an upload.
pub const DEFAULT_PRODUCT_IMAGE: &str = "products/default.jpg";

/// Reduce an uploaded filename to something safe to join onto the upload
/// directory.
///
/// Characters are NFKD-folded and anything non-ASCII is dropped, so `café`
/// becomes `cafe`. Path separators (`/` and `\`) count as whitespace and
/// whitespace runs become a single `_`, so `dir/a.png` becomes `dir_a.png`.
/// Anything outside ASCII alphanumerics and `._-` is then removed, and
/// leading or trailing `.`/`_` are stripped. The result never contains a
/// separator and can never be `..` or a hidden file.
///
/// Returns `None` when nothing usable remains.
///
/// ```
/// use shopfront_core::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Photo.JPG").as_deref(), Some("My_Photo.JPG"));
/// assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
/// assert_eq!(sanitize_filename("..."), None);
/// ```
#[must_use]
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let folded: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if matches!(c, '/' | '\\') { ' ' } else { c })
        .collect();

    let kept: String = folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = kept.trim_matches(['.', '_']);
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Relative image reference stored on the product row for a sanitized filename.
#[must_use]
pub fn product_image_url(sanitized: &str) -> String {
    format!("{PRODUCT_IMAGE_DIR}/{sanitized}")
}
