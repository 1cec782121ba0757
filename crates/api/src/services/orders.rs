//! Checkout and order history.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shoe_store_core::UserId;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::order::order_total;
use crate::models::{MAX_AMOUNT, Order, PlacedOrder};
use crate::services::payment::{PaymentError, StripeClient};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No payment method given.
    #[error("payment method is required")]
    MissingPaymentMethod,

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Order total is larger than an order can record.
    #[error("order total overflow")]
    TotalOverflow,

    /// Payment provider rejected or failed the intent.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    stripe: &'a StripeClient,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            stripe,
        }
    }

    /// Turn the user's cart into an order and open a payment intent for it.
    ///
    /// Runs in one transaction with the cart rows locked. If the payment
    /// provider fails, the transaction is rolled back: no order is left
    /// behind and the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingPaymentMethod` or `EmptyCart` for bad
    /// requests, `Payment` if the provider call fails and `Repository` for
    /// database errors.
    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        payment_method: Option<&str>,
    ) -> Result<PlacedOrder, CheckoutError> {
        let payment_method = payment_method.ok_or(CheckoutError::MissingPaymentMethod)?;

        let mut checkout = self.orders.begin_checkout(user_id).await?;
        if checkout.lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = order_total(checkout.lines().iter().map(|l| (&l.price, l.quantity)))
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or(CheckoutError::TotalOverflow)?;

        let order = checkout.create_order(total, payment_method).await?;

        let intent = self
            .stripe
            .create_payment_intent(total, order.id, &format!("Shoe store order #{}", order.id))
            .await
            .inspect_err(|e| {
                tracing::warn!(order_id = %order.id, error = %e, "Payment intent failed, rolling back order");
            })?;

        checkout.complete(order.id, &intent.id).await?;

        tracing::info!(
            order_id = %order.id,
            %total,
            items = order.items.len(),
            "Order placed"
        );

        Ok(PlacedOrder {
            order,
            client_secret: intent.client_secret,
        })
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        self.orders.list_for_user(user_id).await
    }
}
