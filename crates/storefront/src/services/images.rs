//! Product image uploads on local disk.
//!
//! Files land in `<upload_dir>/products/` under their sanitized original
//! name. A later upload with the same name replaces the earlier file.

use std::io;
use std::path::{Path, PathBuf};

use shopfront_core::{PRODUCT_IMAGE_DIR, product_image_url, sanitize_filename};

/// Writes uploaded product images below the upload root.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `upload_dir`.
    #[must_use]
    pub fn new(upload_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: upload_dir.as_ref().join(PRODUCT_IMAGE_DIR),
        }
    }

    /// Directory product images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an uploaded image.
    ///
    /// Returns the reference to store on the product row, or `None` when the
    /// filename sanitizes to nothing (nothing is written in that case).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be written.
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> io::Result<Option<String>> {
        let Some(filename) = sanitize_filename(original_filename) else {
            tracing::debug!(original_filename, "Upload filename sanitized to nothing");
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        tracing::info!(%filename, size = bytes.len(), "Product image saved");
        Ok(Some(product_image_url(&filename)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_under_products_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());

        let reference = store.save("Blue Widget.png", b"png-bytes").await.unwrap();

        assert_eq!(reference.as_deref(), Some("products/Blue_Widget.png"));
        let written = std::fs::read(tmp.path().join("products/Blue_Widget.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_strips_directory_components() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());

        let reference = store.save("../../evil.jpg", b"x").await.unwrap();

        assert_eq!(reference.as_deref(), Some("products/evil.jpg"));
        assert!(store.dir().join("evil.jpg").exists());
        assert!(!tmp.path().join("evil.jpg").exists());
    }

    #[tokio::test]
    async fn test_unusable_name_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());

        assert_eq!(store.save("../..", b"x").await.unwrap(), None);
        assert!(!store.dir().exists());
    }

    #[tokio::test]
    async fn test_same_name_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());

        store.save("a.jpg", b"first").await.unwrap();
        store.save("a.jpg", b"second").await.unwrap();

        assert_eq!(std::fs::read(store.dir().join("a.jpg")).unwrap(), b"second");
    }
}
