//! Stripe webhook signature verification and event parsing.
//!
//! The `Stripe-Signature` header looks like
//! `t=1700000000,v1=5257a869...,v1=...`. Each `v1` is a hex HMAC-SHA256 of
//! `"{t}.{raw body}"` keyed with the endpoint secret; any one match is enough.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use shoe_store_core::OrderStatus;

use super::PaymentError;

/// Maximum age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a webhook payload against its `Stripe-Signature` header.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` if the header is malformed, the
/// timestamp is outside the tolerance window, or no signature matches.
pub fn verify_signature(
    secret: &str,
    payload: &str,
    header: &str,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".to_owned()))?;
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::InvalidSignature("invalid timestamp".to_owned()))?;

    if now.abs_diff(ts) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".to_owned(),
        ));
    }

    if signatures.is_empty() {
        return Err(PaymentError::InvalidSignature(
            "no v1 signature".to_owned(),
        ));
    }

    let expected = sign(secret, timestamp, payload)?;

    if signatures
        .iter()
        .any(|candidate| constant_time_compare(&expected, candidate))
    {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature(
            "signature mismatch".to_owned(),
        ))
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub(crate) fn sign(secret: &str, timestamp: &str, payload: &str) -> Result<String, PaymentError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// The parts of a webhook event the store reads.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

#[derive(Debug, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub id: Option<String>,
}

impl WebhookEvent {
    /// Parse an event body.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Parse` if the body is not an event.
    pub fn parse(payload: &str) -> Result<Self, PaymentError> {
        serde_json::from_str(payload).map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// What this event means for the order it refers to.
    ///
    /// Returns `None` for event types the store ignores.
    #[must_use]
    pub fn outcome(&self) -> Option<PaymentOutcome<'_>> {
        let status = match self.event_type.as_str() {
            "payment_intent.succeeded" => OrderStatus::Paid,
            "payment_intent.payment_failed" | "payment_intent.failed" => OrderStatus::Failed,
            _ => return None,
        };

        self.data.object.id.as_deref().map(|payment_intent_id| PaymentOutcome {
            payment_intent_id,
            status,
        })
    }
}

/// Order status change requested by a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome<'a> {
    pub payment_intent_id: &'a str,
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_760_000_000;

    fn header_for(payload: &str, ts: i64) -> String {
        let signature = sign(SECRET, &ts.to_string(), payload).unwrap();
        format!("t={ts},v1={signature}")
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_valid_signature() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = header_for(payload, NOW);
        assert!(verify_signature(SECRET, payload, &header, NOW).is_ok());
    }

    #[test]
    fn test_any_v1_may_match() {
        let payload = "{}";
        let good = sign(SECRET, &NOW.to_string(), payload).unwrap();
        let header = format!("t={NOW},v1={},v1={good}", "0".repeat(64));
        assert!(verify_signature(SECRET, payload, &header, NOW).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = header_for(r#"{"amount":100}"#, NOW);
        assert!(matches!(
            verify_signature(SECRET, r#"{"amount":1}"#, &header, NOW),
            Err(PaymentError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = "{}";
        let header = header_for(payload, NOW);
        assert!(verify_signature("whsec_other", payload, &header, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = "{}";
        let header = header_for(payload, NOW - SIGNATURE_TOLERANCE_SECS - 1);
        assert!(verify_signature(SECRET, payload, &header, NOW).is_err());

        let header = header_for(payload, NOW - SIGNATURE_TOLERANCE_SECS);
        assert!(verify_signature(SECRET, payload, &header, NOW).is_ok());
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(verify_signature(SECRET, "{}", "", NOW).is_err());
        assert!(verify_signature(SECRET, "{}", "v1=abc", NOW).is_err());
        assert!(verify_signature(SECRET, "{}", &format!("t={NOW}"), NOW).is_err());
        assert!(verify_signature(SECRET, "{}", "t=soon,v1=abc", NOW).is_err());
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        for ts in [i64::MIN, i64::MAX] {
            let header = format!("t={ts},v1=00");
            assert!(matches!(
                verify_signature(SECRET, "{}", &header, NOW),
                Err(PaymentError::InvalidSignature(_))
            ));
        }
    }

    fn event(event_type: &str) -> WebhookEvent {
        WebhookEvent::parse(&format!(
            r#"{{"id":"evt_1","type":"{event_type}","data":{{"object":{{"id":"pi_123","object":"payment_intent"}}}}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_succeeded_marks_paid() {
        let event = event("payment_intent.succeeded");
        assert_eq!(
            event.outcome(),
            Some(PaymentOutcome {
                payment_intent_id: "pi_123",
                status: OrderStatus::Paid
            })
        );
    }

    #[test]
    fn test_failed_event_names_mark_failed() {
        for name in ["payment_intent.payment_failed", "payment_intent.failed"] {
            assert_eq!(
                event(name).outcome().unwrap().status,
                OrderStatus::Failed
            );
        }
    }

    #[test]
    fn test_other_events_ignored() {
        assert_eq!(event("charge.refunded").outcome(), None);
    }

    #[test]
    fn test_non_event_body_is_parse_error() {
        assert!(matches!(
            WebhookEvent::parse("[1,2,3]"),
            Err(PaymentError::Parse(_))
        ));
    }
}
