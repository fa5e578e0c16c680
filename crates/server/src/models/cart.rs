//! Cart domain types.

use serde::Serialize;

use warung_core::{CartItemId, Price, ProductId, Stock};

/// A cart row joined with its product, as returned by `GET /api/cart`.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// Cart row ID.
    pub id: CartItemId,
    /// Quantity in the cart, always positive.
    pub quantity: i64,
    /// Product being bought.
    pub product_id: ProductId,
    /// Product display name.
    pub name: String,
    /// Product unit price.
    pub price: Price,
    /// Units currently in stock (display only; never decremented here).
    pub stock: Stock,
    /// Product image URL, if any.
    pub image_url: Option<String>,
}
