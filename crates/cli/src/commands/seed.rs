//! Seed the catalog from a YAML product list.
//!
//! ```yaml
//! - name: Widget
//!   description: A very useful widget
//!   price: 9.99
//!   stock: 5
//!   category: tools
//! - name: Gadget
//!   price: "$24.50"
//!   stock: 0
//!   image_url: products/gadget.jpg
//! ```
//!
//! Every entry is validated before anything is written.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use shopfront_core::DEFAULT_PRODUCT_IMAGE;
use shopfront_storefront::db::ProductRepository;
use shopfront_storefront::models::{ProductInput, ProductInputError};

/// One product entry as written in the seed file.
///
/// `price` and `stock` are read as YAML scalars so both `9.99` and `"9.99"`
/// are accepted, then validated like the admin form.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: serde_yaml::Value,
    #[serde(default)]
    pub stock: Option<serde_yaml::Value>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SeedProduct {
    /// Validate into the same input the admin form produces.
    ///
    /// # Errors
    ///
    /// Returns `ProductInputError` for a missing name or a bad price or stock.
    pub fn input(&self) -> Result<ProductInput, ProductInputError> {
        let stock = self.stock.as_ref().map_or_else(|| "0".to_owned(), scalar_text);
        ProductInput::parse(
            &self.name,
            &self.description,
            &scalar_text(&self.price),
            &stock,
            &self.category,
        )
    }
}

fn scalar_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Parse and validate a seed file's contents.
///
/// # Errors
///
/// Returns an error describing every invalid entry.
pub fn parse(content: &str) -> Result<Vec<(ProductInput, String)>, Box<dyn std::error::Error>> {
    let entries: Vec<SeedProduct> = serde_yaml::from_str(content)?;

    let mut products = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry.input() {
            Ok(input) => {
                let image_url = entry
                    .image_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_owned());
                products.push((input, image_url));
            }
            Err(e) => errors.push(format!("entry {} ({:?}): {e}", index + 1, entry.name)),
        }
    }

    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    Ok(products)
}

/// Insert every product in `file_path`.
///
/// With `clear_existing`, cart lines and products are deleted first, in one
/// transaction.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a database
/// operation fails.
pub async fn products(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Validate before connecting
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse(&content)?;
    info!(products = products.len(), "Seed file validated");

    let pool = super::connect().await?;

    if clear_existing {
        let mut tx = pool.begin().await?;
        let cart_lines = sqlx::query("DELETE FROM cart")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let removed = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        info!(cart_lines, products = removed, "Cleared existing catalog");
    }

    let repo = ProductRepository::new(&pool);
    let mut inserted = 0_usize;
    for (input, image_url) in &products {
        let product = repo.create(input, image_url).await?;
        info!(product_id = %product.id, "  {}", product.name);
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_numbers_and_strings() {
        let products = parse(
            r#"
- name: Widget
  description: A very useful widget
  price: 9.99
  stock: 5
  category: tools
- name: Gadget
  price: "$24.50"
  image_url: products/gadget.jpg
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        let (widget, widget_image) = &products[0];
        assert_eq!(widget.price.to_string(), "$9.99");
        assert_eq!(widget.stock, 5);
        assert_eq!(widget_image, DEFAULT_PRODUCT_IMAGE);

        let (gadget, gadget_image) = &products[1];
        assert_eq!(gadget.price.to_string(), "$24.50");
        assert_eq!(gadget.stock, 0);
        assert_eq!(gadget_image, "products/gadget.jpg");
    }

    #[test]
    fn test_parse_rejects_invalid_entries() {
        let result = parse(
            r"
- name: Widget
  price: free
- name: Gadget
  price: 1
  stock: -1
",
        );
        assert!(result.unwrap_err().to_string().starts_with("2 validation errors"));
    }

    #[test]
    fn test_parse_rejects_non_list() {
        assert!(parse("name: Widget").is_err());
    }
}
