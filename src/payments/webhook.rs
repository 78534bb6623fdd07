//! Stripe webhook payloads and `Stripe-Signature` verification.
use crate::error::{AppError, AppResult};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> AppResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    /// Id of the object the event is about (the payment intent id).
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id")?.as_str()
    }
}

fn invalid_signature(reason: &str) -> AppError {
    AppError::rejected("INVALID_SIGNATURE", format!("Invalid signature: {}", reason))
}

/// Check a `t=<unix>,v1=<hex>` header against `HMAC-SHA256(secret, "{t}.{payload}")`.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> AppResult<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid_signature("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(invalid_signature("no v1 signature"));
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(invalid_signature("timestamp outside the tolerance zone"));
    }

    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);

    let matched = signatures.iter().any(|candidate| {
        let Ok(expected) = hex::decode(candidate) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(&signed);
        mac.verify_slice(&expected).is_ok()
    });

    if matched {
        Ok(())
    } else {
        Err(invalid_signature("no signature matches the payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_123"}}}"#;

    /// Builds a header the way Stripe signs deliveries.
    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Config(e.to_string()))?;
        mac.update(format!("{}.", timestamp).as_bytes());
        mac.update(payload);
        Ok(format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let header = sign(PAYLOAD, SECRET, 1_700_000_000).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let header = sign(PAYLOAD, SECRET, 1_700_000_000).unwrap();
        let err = verify_signature(b"{}", &header, SECRET, 1_700_000_000).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = sign(PAYLOAD, SECRET, 1_700_000_000).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_301).is_err());
    }

    #[test]
    fn test_any_matching_v1_signature_passes() {
        let signed = sign(PAYLOAD, SECRET, 1_700_000_000).unwrap();
        let good = signed.split_once(",v1=").unwrap().1;
        let header = format!("t=1700000000,v1=deadbeef,v1={}", good);
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000).is_ok());
    }

    #[test]
    fn test_missing_parts_are_rejected() {
        assert!(verify_signature(PAYLOAD, "v1=abcd", SECRET, 0).is_err());
        assert!(verify_signature(PAYLOAD, "t=0", SECRET, 0).is_err());
        assert!(verify_signature(PAYLOAD, "", SECRET, 0).is_err());
    }

    #[test]
    fn test_parse_event() {
        let event = WebhookEvent::parse(PAYLOAD).unwrap();
        assert_eq!(event.kind(), PAYMENT_INTENT_SUCCEEDED);
        assert_eq!(event.object_id(), Some("pi_123"));

        let bare = WebhookEvent::parse(br#"{"id":"evt_1"}"#).unwrap();
        assert_eq!(bare.kind(), "");
        assert_eq!(bare.object_id(), None);

        assert!(WebhookEvent::parse(b"not json").is_err());
    }
}
