//! Cart route handlers.
//!
//! Every cart belongs to the bearer of the token; there is no way to address
//! another user's cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use shoe_store_core::ProductId;

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartItem;
use crate::models::cart::{AddToCart, MAX_CART_QUANTITY};
use crate::state::AppState;

/// Acknowledgement body for cart writes.
#[derive(Debug, Serialize)]
pub struct CartMessage {
    pub message: &'static str,
}

fn check_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_owned(),
        ));
    }
    if quantity > MAX_CART_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "Quantity cannot exceed {MAX_CART_QUANTITY}"
        )));
    }
    Ok(())
}

/// The caller's cart lines with their products.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

/// Add a product, or increase its quantity if it is already in the cart.
///
/// The combined quantity is capped at [`MAX_CART_QUANTITY`].
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(line): Json<AddToCart>,
) -> Result<Json<CartMessage>> {
    check_quantity(line.quantity)?;

    CartRepository::new(state.pool())
        .add(user.id, line.product_id, line.quantity, MAX_CART_QUANTITY)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("Product {} not found", line.product_id))
            }
            other => other.into(),
        })?;

    Ok(Json(CartMessage {
        message: "Added to cart",
    }))
}

/// Set the quantity of a cart line. The body is a bare JSON integer.
///
/// A product that is not in the cart is left alone.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(quantity): Json<i32>,
) -> Result<Json<CartMessage>> {
    check_quantity(quantity)?;

    let updated = CartRepository::new(state.pool())
        .set_quantity(user.id, product_id, quantity)
        .await?;
    if !updated {
        tracing::debug!(%product_id, "Quantity update for product not in cart");
    }

    Ok(Json(CartMessage {
        message: "Quantity updated",
    }))
}

/// Remove a product from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartMessage>> {
    CartRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;

    Ok(Json(CartMessage {
        message: "Removed from cart",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(12).is_ok());
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(-4).is_err());
        assert!(check_quantity(MAX_CART_QUANTITY).is_ok());
        assert!(check_quantity(MAX_CART_QUANTITY + 1).is_err());
        assert!(check_quantity(i32::MAX).is_err());
    }
}
