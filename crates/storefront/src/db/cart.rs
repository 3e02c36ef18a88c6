//! Cart repository for database operations.
//!
//! A cart is the set of `cart` rows for one user, keyed by
//! `(user_id, product_id)`. There is no separate cart entity.

use sqlx::PgPool;

use shopfront_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    product: ProductRow,
    quantity: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to a user's cart.
    ///
    /// Inserts a line with quantity 1, or increments the existing line, in a
    /// single statement so concurrent adds cannot create duplicate rows.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user or product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_one(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<i32, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO cart (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart.quantity + 1
            RETURNING quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(quantity)
    }

    /// Remove a whole line from a user's cart.
    ///
    /// Returns `true` if a line was deleted, `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All lines in a user's cart, joined with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT p.id, p.name, p.description, p.price, p.image_url, p.stock,
                   p.category, p.created_at, c.quantity
            FROM products p
            INNER JOIN cart c ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY p.name, p.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CartLine {
                product: r.product.into(),
                quantity: r.quantity,
            })
            .collect())
    }

    /// Total units across a user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
