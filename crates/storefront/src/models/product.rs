//! Catalog and cart domain types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use shopfront_core::{Price, PriceError, ProductId};

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Path relative to the upload root, e.g. `products/widget.jpg`.
    pub image_url: String,
    pub stock: i32,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a user's cart: the product joined with its quantity.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    /// Always at least 1.
    pub quantity: i32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Errors in submitted product fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductInputError {
    #[error("name is required")]
    MissingName,
    #[error("invalid price: {0}")]
    Price(#[from] PriceError),
    #[error("stock must be a whole number of at least 0, got {0:?}")]
    Stock(String),
}

/// Validated product fields from the admin add/edit forms.
///
/// The image is handled separately since edits may leave it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub category: String,
}

impl ProductInput {
    /// Validate raw form values.
    ///
    /// # Errors
    ///
    /// Returns `ProductInputError` for an empty name, an unparseable or
    /// negative price, or a stock value that is not a non-negative integer.
    pub fn parse(
        name: &str,
        description: &str,
        price: &str,
        stock: &str,
        category: &str,
    ) -> Result<Self, ProductInputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductInputError::MissingName);
        }

        let price = Price::parse(price)?;

        let stock = stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or_else(|| ProductInputError::Stock(stock.trim().to_owned()))?;

        Ok(Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            price,
            stock,
            category: category.trim().to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_input() {
        let input = ProductInput::parse(" Widget ", "A widget", "9.99", "5", "tools").unwrap();
        assert_eq!(input.name, "Widget");
        assert_eq!(input.price, Price::parse("9.99").unwrap());
        assert_eq!(input.stock, 5);
        assert_eq!(input.category, "tools");
    }

    #[test]
    fn test_parse_requires_name() {
        assert_eq!(
            ProductInput::parse("  ", "", "1", "1", ""),
            Err(ProductInputError::MissingName)
        );
    }

    #[test]
    fn test_parse_rejects_bad_price() {
        assert!(matches!(
            ProductInput::parse("Widget", "", "cheap", "1", ""),
            Err(ProductInputError::Price(PriceError::NotANumber(_)))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_stock() {
        assert_eq!(
            ProductInput::parse("Widget", "", "1", "-3", ""),
            Err(ProductInputError::Stock("-3".to_owned()))
        );
        assert_eq!(
            ProductInput::parse("Widget", "", "1", "2.5", ""),
            Err(ProductInputError::Stock("2.5".to_owned()))
        );
    }

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product: Product {
                id: ProductId::new(1),
                name: "Widget".to_owned(),
                description: String::new(),
                price: Price::parse("2.50").unwrap(),
                image_url: shopfront_core::DEFAULT_PRODUCT_IMAGE.to_owned(),
                stock: 10,
                category: String::new(),
                created_at: Utc::now(),
            },
            quantity: 3,
        };
        assert_eq!(line.line_total().to_string(), "$7.50");
    }
}
