//! Product domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use warung_core::{Price, ProductId, Stock};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Price in whole currency units, always positive.
    pub price: Price,
    /// Units in stock, never negative.
    pub stock: Stock,
    /// Public URL of the processed product image, if one was uploaded.
    pub image_url: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The image store key for this product, derived from its public URL.
    ///
    /// Returns `None` when no image is attached.
    #[must_use]
    pub fn image_key(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(image_url: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Kopi Gayo".to_string(),
            description: "Arabica 250g".to_string(),
            price: Price::new(55000).unwrap(),
            stock: Stock::new(10).unwrap(),
            image_url: image_url.map(String::from),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_image_key_from_url() {
        let product = sample(Some("/uploads/abc123.jpg"));
        assert_eq!(product.image_key(), Some("abc123.jpg"));
    }

    #[test]
    fn test_image_key_none() {
        assert_eq!(sample(None).image_key(), None);
    }
}
