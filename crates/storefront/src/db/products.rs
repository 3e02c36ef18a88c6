//! Product repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{Product, ProductInput};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    image_url: String,
    stock: i32,
    category: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            stock: row.stock,
            category: row.category,
            created_at: row.created_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, stock, category, created_at
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, stock, category, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a constraint rejects the values.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        input: &ProductInput,
        image_url: &str,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, description, price, image_url, stock, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, price, image_url, stock, category, created_at
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(image_url)
        .bind(input.stock)
        .bind(&input.category)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a product's fields.
    ///
    /// With `Some(image_url)` the image reference is replaced; with `None` the
    /// stored `image_url` is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let query = match image_url {
            Some(image_url) => sqlx::query_as::<_, ProductRow>(
                r"
                UPDATE products
                SET name = $2, description = $3, price = $4, stock = $5, category = $6,
                    image_url = $7
                WHERE id = $1
                RETURNING id, name, description, price, image_url, stock, category, created_at
                ",
            )
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.category)
            .bind(image_url),
            None => sqlx::query_as::<_, ProductRow>(
                r"
                UPDATE products
                SET name = $2, description = $3, price = $4, stock = $5, category = $6
                WHERE id = $1
                RETURNING id, name, description, price, image_url, stock, category, created_at
                ",
            )
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.stock)
            .bind(&input.category),
        };

        let row = query
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product and every cart line that references it.
    ///
    /// Both statements run in one transaction. The transaction is rolled back
    /// if either statement fails or if no product row matched.
    ///
    /// Returns the number of cart lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = async {
            let cart_lines = sqlx::query("DELETE FROM cart WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            let products = sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if products == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok::<_, RepositoryError>(cart_lines)
        }
        .await;

        match result {
            Ok(cart_lines) => {
                tx.commit().await?;
                Ok(cart_lines)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(product_id = %id, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}
