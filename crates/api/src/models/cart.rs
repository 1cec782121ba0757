//! Cart items.

use serde::{Deserialize, Serialize};

use shoe_store_core::{CartItemId, ProductId, UserId};

use super::Product;

/// Most units of one product a cart line may hold.
pub const MAX_CART_QUANTITY: i32 = 1_000;

/// A pending cart line with its product embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub product: Product,
}

/// Body of `POST /api/cart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: i32,
}
