//! Payment provider webhook.
//!
//! The body must be read raw: the signature covers the exact bytes Stripe
//! sent, so it is verified before any JSON parsing.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::services::payment::webhook::WebhookEvent;
use crate::state::AppState;

/// Header carrying the `t=...,v1=...` signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receive a payment event and update the matching order.
///
/// Event types the store does not act on are acknowledged with 200.
#[instrument(skip_all, fields(event_type))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: String,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature".to_owned()))?;

    state.stripe().verify_webhook(&payload, signature)?;

    let event = WebhookEvent::parse(&payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid event: {e}")))?;
    tracing::Span::current().record("event_type", event.event_type.as_str());

    let Some(outcome) = event.outcome() else {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(StatusCode::OK);
    };

    let updated = OrderRepository::new(state.pool())
        .set_status_by_payment_intent(outcome.payment_intent_id, outcome.status)
        .await?;

    match updated {
        Some(order_id) => tracing::info!(
            %order_id,
            status = ?outcome.status,
            "Order payment status updated"
        ),
        None => tracing::warn!(
            payment_intent_id = outcome.payment_intent_id,
            "No updatable order for payment intent"
        ),
    }

    Ok(StatusCode::OK)
}
