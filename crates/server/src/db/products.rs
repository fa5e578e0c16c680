//! Product repository for catalog operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use warung_core::{Price, ProductId, Stock};

use super::RepositoryError;
use crate::models::Product;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: i64,
    stock: i64,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let stock = Stock::new(row.stock).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            stock,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Validated fields for a product create or update.
#[derive(Debug)]
pub struct ProductFields {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: Stock,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, image_url, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        fields: &ProductFields,
        image_url: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (name, description, price, stock, image_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.as_i64())
        .bind(fields.stock.as_i64())
        .bind(image_url)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update a product.
    ///
    /// All text and numeric fields are replaced. The image URL is only
    /// replaced when `new_image_url` is `Some`; passing `None` keeps the
    /// existing image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields,
        new_image_url: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = ?1,
                description = ?2,
                price = ?3,
                stock = ?4,
                image_url = COALESCE(?5, image_url),
                updated_at = ?6
            WHERE id = ?7
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price.as_i64())
        .bind(fields.stock.as_i64())
        .bind(new_image_url)
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product and return it, so callers can clean up its image.
    ///
    /// Cart rows referencing the product are removed by the cascading
    /// foreign key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM products WHERE id = ?1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_pool_in_memory;

    fn fields(name: &str, price: i64, stock: i64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: "desc".to_string(),
            price: Price::new(price).unwrap(),
            stock: Stock::new(stock).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_list_ordered_by_id() {
        let pool = create_pool_in_memory().await.unwrap();
        let repo = ProductRepository::new(&pool);

        repo.create(&fields("Kopi", 55000, 10), None).await.unwrap();
        repo.create(&fields("Teh", 20000, 5), Some("/uploads/t.jpg"))
            .await
            .unwrap();

        let products = repo.list().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Kopi");
        assert_eq!(products[1].image_url.as_deref(), Some("/uploads/t.jpg"));
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_none() {
        let pool = create_pool_in_memory().await.unwrap();
        let repo = ProductRepository::new(&pool);

        let product = repo
            .create(&fields("Kopi", 55000, 10), Some("/uploads/k.jpg"))
            .await
            .unwrap();

        let updated = repo
            .update(product.id, &fields("Kopi Gayo", 60000, 8), None)
            .await
            .unwrap();
        assert_eq!(updated.name, "Kopi Gayo");
        assert_eq!(updated.price.as_i64(), 60000);
        assert_eq!(updated.image_url.as_deref(), Some("/uploads/k.jpg"));
    }

    #[tokio::test]
    async fn test_update_replaces_image_when_some() {
        let pool = create_pool_in_memory().await.unwrap();
        let repo = ProductRepository::new(&pool);

        let product = repo
            .create(&fields("Kopi", 55000, 10), Some("/uploads/old.jpg"))
            .await
            .unwrap();

        let updated = repo
            .update(product.id, &fields("Kopi", 55000, 10), Some("/uploads/new.jpg"))
            .await
            .unwrap();
        assert_eq!(updated.image_url.as_deref(), Some("/uploads/new.jpg"));
    }

    #[tokio::test]
    async fn test_delete_returns_old_row() {
        let pool = create_pool_in_memory().await.unwrap();
        let repo = ProductRepository::new(&pool);

        let product = repo
            .create(&fields("Kopi", 55000, 10), Some("/uploads/k.jpg"))
            .await
            .unwrap();

        let deleted = repo.delete(product.id).await.unwrap();
        assert_eq!(deleted.image_url.as_deref(), Some("/uploads/k.jpg"));
        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let pool = create_pool_in_memory().await.unwrap();
        let repo = ProductRepository::new(&pool);

        let err = repo.delete(ProductId::new(404)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
