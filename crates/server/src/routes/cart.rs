//! Cart route handlers.
//!
//! All endpoints require a bearer token. Mutations are forbidden for
//! admins; the catalog is theirs, the carts are not.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use warung_core::{CartItemId, ProductId};

use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::CartLine;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub quantity: Option<i64>,
}

/// `GET /api/cart`
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(lines))
}

/// `POST /api/cart`
///
/// Folds repeated adds of the same product into one row; the stored
/// quantity never exceeds the product's stock.
pub async fn add(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<AddRequest>,
) -> Result<Response> {
    let Some(product_id) = body.product_id else {
        return Err(AppError::Validation("Product ID wajib".to_string()));
    };
    current.forbid_admin("Admin tidak bisa menambahkan produk ke keranjang")?;

    let quantity = body.quantity.filter(|q| *q > 0).unwrap_or(1);
    let product_id = ProductId::new(product_id);

    let product = ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Produk tidak ditemukan".to_string()))?;
    if product.stock.is_empty() {
        return Err(AppError::Validation("Stok tidak mencukupi".to_string()));
    }

    let repo = CartRepository::new(state.pool());
    let existing = repo.find_by_product(current.id, product_id).await?;
    repo.add(current.id, product_id, quantity)
        .await
        .map_err(|e| match e {
            // Stock ran out between the check above and the insert.
            crate::db::RepositoryError::Conflict(_) => {
                AppError::Validation("Stok tidak mencukupi".to_string())
            }
            other => AppError::Database(other),
        })?;

    if existing.is_some() {
        return Ok(Json(json!({ "message": "Cart diperbarui" })).into_response());
    }

    let line = repo
        .find_by_product(current.id, product_id)
        .await?
        .ok_or_else(|| AppError::Internal("cart row missing after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(line)).into_response())
}

/// `PUT /api/cart/{id}`
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<CartLine>> {
    current.forbid_admin("Admin tidak bisa mengubah keranjang")?;

    let Some(quantity) = body.quantity.filter(|q| *q >= 1) else {
        return Err(AppError::Validation("Quantity minimal 1".to_string()));
    };

    let item_id = CartItemId::new(id);
    let repo = CartRepository::new(state.pool());

    let line = repo
        .get_line(current.id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item tidak ditemukan".to_string()))?;
    if quantity > line.stock.as_i64() {
        return Err(AppError::Validation("Stok tidak mencukupi".to_string()));
    }

    repo.update_quantity(current.id, item_id, quantity)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Item tidak ditemukan".to_string())
            }
            other => AppError::Database(other),
        })?;

    let line = repo
        .get_line(current.id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item tidak ditemukan".to_string()))?;

    Ok(Json(line))
}

/// `DELETE /api/cart/{id}`
pub async fn remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    current.forbid_admin("Admin tidak bisa menghapus keranjang")?;

    CartRepository::new(state.pool())
        .remove(current.id, CartItemId::new(id))
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Item tidak ditemukan".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(json!({ "message": "Item dihapus dari cart" })))
}
