//! Cart repository.
//!
//! One row per `(user_id, product_id)`, enforced by a unique index; adding
//! a product that is already in the cart folds into the existing row.

use chrono::Utc;
use sqlx::SqlitePool;

use warung_core::{CartItemId, Price, ProductId, Stock, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Internal row type for cart queries joined with products.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    quantity: i64,
    product_id: i64,
    name: String,
    price: i64,
    stock: i64,
    image_url: Option<String>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let stock = Stock::new(row.stock).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock in database: {e}"))
        })?;

        Ok(Self {
            id: CartItemId::new(row.id),
            quantity: row.quantity,
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price,
            stock,
            image_url: row.image_url,
        })
    }
}

const CART_LINE_COLUMNS: &str = r"
    c.id, c.quantity,
    p.id AS product_id, p.name, p.price, p.stock, p.image_url
";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the cart for a user, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            r"
            SELECT {CART_LINE_COLUMNS}
            FROM cart c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.id
            "
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one cart line belonging to a user.
    ///
    /// Scoping by `user_id` means another user's line is simply absent,
    /// which callers report as not found rather than forbidden.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_line(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            r"
            SELECT {CART_LINE_COLUMNS}
            FROM cart c
            JOIN products p ON p.id = c.product_id
            WHERE c.id = ?1 AND c.user_id = ?2
            "
        ))
        .bind(item_id.as_i64())
        .bind(user_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Find a user's cart line for a specific product, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn find_by_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            r"
            SELECT {CART_LINE_COLUMNS}
            FROM cart c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1 AND c.product_id = ?2
            "
        ))
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Add a product to a user's cart, folding into an existing line.
    ///
    /// The stored quantity is capped at the product's current stock, both
    /// on insert and when summing into an existing line. If stock hits zero
    /// between the caller's check and this statement, the cap would store a
    /// zero quantity; the `CHECK (quantity > 0)` constraint catches that and
    /// is reported as a conflict, not a server error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is out of stock.
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart (user_id, product_id, quantity, created_at)
            VALUES (?1, ?2, MIN(?3, (SELECT stock FROM products WHERE id = ?2)), ?4)
            ON CONFLICT(user_id, product_id) DO UPDATE
            SET quantity = MIN(
                cart.quantity + excluded.quantity,
                (SELECT stock FROM products WHERE id = ?2)
            )
            ",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_check_violation()
            {
                return RepositoryError::Conflict("product out of stock".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Set the quantity of a user's cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist or
    /// belongs to another user.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart SET quantity = ?1 WHERE id = ?2 AND user_id = ?3",
        )
        .bind(quantity)
        .bind(item_id.as_i64())
        .bind(user_id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a user's cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist or
    /// belongs to another user.
    pub async fn remove(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE id = ?1 AND user_id = ?2")
            .bind(item_id.as_i64())
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
