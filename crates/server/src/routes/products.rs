//! Product catalog route handlers.
//!
//! Reads are public; writes require an admin bearer token and arrive as
//! multipart forms so an image can ride along with the fields.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use warung_core::{Price, ProductId, Stock};

use crate::db::products::{ProductFields, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::Product;
use crate::state::AppState;

/// Raw multipart form fields for a product write.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    stock: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

impl ProductForm {
    /// Drain a multipart stream into its known fields.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::Validation("Form tidak valid".to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "name" => form.name = Some(read_text(field).await?),
                "description" => form.description = Some(read_text(field).await?),
                "price" => form.price = Some(read_text(field).await?),
                "stock" => form.stock = Some(read_text(field).await?),
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| AppError::Validation("Form tidak valid".to_string()))?;
                    if !bytes.is_empty() {
                        form.image = Some((filename, bytes.to_vec()));
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the text fields.
    fn fields(&self) -> Result<ProductFields> {
        let (Some(name), Some(description), Some(price), Some(stock)) = (
            self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.description
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            self.price.as_deref(),
            self.stock.as_deref(),
        ) else {
            return Err(AppError::Validation("Semua field wajib diisi".to_string()));
        };

        let price = price
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| Price::new(v).ok())
            .ok_or_else(|| {
                AppError::Validation("Harga harus angka bulat positif".to_string())
            })?;
        let stock = stock
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| Stock::new(v).ok())
            .ok_or_else(|| {
                AppError::Validation("Stok harus angka bulat positif atau nol".to_string())
            })?;

        Ok(ProductFields {
            name: name.to_string(),
            description: description.to_string(),
            price,
            stock,
        })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|_| AppError::Validation("Form tidak valid".to_string()))
}

/// `GET /api/products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Produk tidak ditemukan".to_string()))?;

    Ok(Json(product))
}

/// `POST /api/products` (admin only, multipart)
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    current.require_admin()?;

    let form = ProductForm::read(multipart).await?;
    let fields = form.fields()?;

    let image_url = match &form.image {
        Some((filename, bytes)) => {
            let key = state.images().save(filename, bytes.clone()).await?;
            Some(state.images().url_for(&key))
        }
        None => None,
    };

    let product = ProductRepository::new(state.pool())
        .create(&fields, image_url.as_deref())
        .await?;
    tracing::info!(product_id = %product.id, admin = %current.username, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` (admin only, multipart)
///
/// Keeps the existing image unless a new one is uploaded; the replaced
/// file is deleted after the row update succeeds.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    current.require_admin()?;

    let form = ProductForm::read(multipart).await?;
    let fields = form.fields()?;

    let repo = ProductRepository::new(state.pool());
    let existing = repo
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Produk tidak ditemukan".to_string()))?;

    let new_image_url = match &form.image {
        Some((filename, bytes)) => {
            let key = state.images().save(filename, bytes.clone()).await?;
            Some(state.images().url_for(&key))
        }
        None => None,
    };

    let product = repo
        .update(existing.id, &fields, new_image_url.as_deref())
        .await?;

    if new_image_url.is_some()
        && let Some(old_key) = existing.image_key()
    {
        state.images().delete(old_key).await?;
    }
    tracing::info!(product_id = %product.id, admin = %current.username, "product updated");

    Ok(Json(product))
}

/// `DELETE /api/products/{id}` (admin only)
pub async fn destroy(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    current.require_admin()?;

    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Produk tidak ditemukan".to_string())
            }
            other => AppError::Database(other),
        })?;

    if let Some(key) = deleted.image_key() {
        state.images().delete(key).await?;
    }
    tracing::info!(product_id = %deleted.id, admin = %current.username, "product deleted");

    Ok(Json(json!({ "message": "Produk berhasil dihapus" })))
}
