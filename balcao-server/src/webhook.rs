//! MercadoPago webhook signature verification
//!
//! Notifications carry an `x-signature` header of the form
//! `ts=1704908010,v1=<hex hmac>` and an `x-request-id` header. The
//! HMAC-SHA256 is computed over the canonical manifest
//! `id:{data.id};request-id:{x-request-id};ts:{ts};` with the account
//! secret. Both headers and the body's `data.id` are required; a
//! notification missing any of them is rejected before the digest is
//! ever computed.
//!
//! Verification is all-or-nothing: callers only learn accept/reject,
//! the specific failure goes to the logs.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

/// Why a notification was rejected (internal, logged only)
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Missing x-signature header")]
    MissingSignature,

    #[error("Missing x-request-id header")]
    MissingRequestId,

    #[error("Body has no data.id")]
    MissingDataId,

    #[error("Malformed x-signature header (ts or v1 not found)")]
    MalformedSignature,

    #[error("Invalid timestamp in x-signature")]
    InvalidTimestamp,

    #[error("Notification outside replay window (age {age}s)")]
    Stale { age: i64 },

    #[error("Signature is not valid hex")]
    InvalidHex,

    #[error("Signature mismatch")]
    Mismatch,

    #[error("Body is not valid JSON")]
    InvalidJson,
}

/// A notification that passed verification
#[derive(Debug)]
pub struct VerifiedNotification {
    pub body: serde_json::Value,
    pub data_id: String,
    pub ts: i64,
}

/// Verify a MercadoPago webhook notification
///
/// `now` is injected so the replay window is testable.
pub fn verify_notification(
    body: &[u8],
    x_signature: Option<&str>,
    x_request_id: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<VerifiedNotification, VerifyError> {
    let sig_header = x_signature.ok_or(VerifyError::MissingSignature)?;
    let request_id = x_request_id
        .filter(|s| !s.is_empty())
        .ok_or(VerifyError::MissingRequestId)?;

    let parsed: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| VerifyError::InvalidJson)?;
    let data_id = match parsed.pointer("/data/id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(VerifyError::MissingDataId),
    };

    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("ts=") {
            timestamp = t.trim();
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v.trim();
        }
    }
    if timestamp.is_empty() || signature.is_empty() {
        return Err(VerifyError::MalformedSignature);
    }

    // Replay window first: a stale notification is rejected before any
    // digest work
    let ts: i64 = timestamp.parse().map_err(|_| VerifyError::InvalidTimestamp)?;
    let age = now - ts;
    if age.abs() > tolerance_secs {
        return Err(VerifyError::Stale { age });
    }

    let manifest = format!("id:{data_id};request-id:{request_id};ts:{ts};");

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| VerifyError::MalformedSignature)?;
    mac.update(manifest.as_bytes());

    // Constant-time comparison via hmac::verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| VerifyError::InvalidHex)?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| VerifyError::Mismatch)?;

    Ok(VerifiedNotification {
        body: parsed,
        data_id,
        ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_webhook_secret";

    fn sign(data_id: &str, request_id: &str, ts: i64) -> String {
        let manifest = format!("id:{data_id};request-id:{request_id};ts:{ts};");
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(manifest.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn body(data_id: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": "payment",
            "data": { "id": data_id }
        }))
        .unwrap()
    }

    #[test]
    fn test_fresh_notification_accepted() {
        let now = 1_704_908_010;
        let v1 = sign("12345", "req-1", now);
        let header = format!("ts={now},v1={v1}");

        let verified = verify_notification(
            &body("12345"),
            Some(&header),
            Some("req-1"),
            SECRET,
            300,
            now,
        )
        .unwrap();
        assert_eq!(verified.data_id, "12345");
        assert_eq!(verified.ts, now);
    }

    #[test]
    fn test_numeric_data_id() {
        let now = 1_704_908_010;
        let v1 = sign("777", "req-1", now);
        let header = format!("ts={now},v1={v1}");
        let body = serde_json::to_vec(&serde_json::json!({"data": {"id": 777}})).unwrap();

        let verified =
            verify_notification(&body, Some(&header), Some("req-1"), SECRET, 300, now).unwrap();
        assert_eq!(verified.data_id, "777");
    }

    #[test]
    fn test_stale_notification_rejected() {
        let now = 1_704_908_010;
        let ts = now - 301;
        let v1 = sign("12345", "req-1", ts);
        let header = format!("ts={ts},v1={v1}");

        let err = verify_notification(
            &body("12345"),
            Some(&header),
            Some("req-1"),
            SECRET,
            300,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::Stale { age: 301 }));

        // exactly at the window edge still passes
        let ts = now - 300;
        let v1 = sign("12345", "req-1", ts);
        let header = format!("ts={ts},v1={v1}");
        assert!(
            verify_notification(
                &body("12345"),
                Some(&header),
                Some("req-1"),
                SECRET,
                300,
                now,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_tampered_data_id_rejected() {
        let now = 1_704_908_010;
        let v1 = sign("12345", "req-1", now);
        let header = format!("ts={now},v1={v1}");

        let err = verify_notification(
            &body("99999"),
            Some(&header),
            Some("req-1"),
            SECRET,
            300,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch));
    }

    #[test]
    fn test_missing_or_malformed_headers() {
        let now = 1_704_908_010;
        let rid = Some("req-1");
        assert!(matches!(
            verify_notification(&body("1"), None, rid, SECRET, 300, now),
            Err(VerifyError::MissingSignature)
        ));
        assert!(matches!(
            verify_notification(&body("1"), Some("ts=123"), rid, SECRET, 300, now),
            Err(VerifyError::MalformedSignature)
        ));
        assert!(matches!(
            verify_notification(&body("1"), Some("v1=abcd"), rid, SECRET, 300, now),
            Err(VerifyError::MalformedSignature)
        ));
        assert!(matches!(
            verify_notification(&body("1"), Some("ts=abc,v1=abcd"), rid, SECRET, 300, now),
            Err(VerifyError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let now = 1_704_908_010;
        let header = format!("ts={now},v1=zzzz");
        assert!(matches!(
            verify_notification(&body("1"), Some(&header), Some("req-1"), SECRET, 300, now),
            Err(VerifyError::InvalidHex)
        ));
    }

    #[test]
    fn test_missing_request_id_rejected() {
        // a signature computed over a manifest without the request-id
        // part must not verify; the header is required
        let now = 1_704_908_010;
        let manifest = format!("id:55;ts:{now};");
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(manifest.as_bytes());
        let v1 = hex::encode(mac.finalize().into_bytes());
        let header = format!("ts={now},v1={v1}");

        assert!(matches!(
            verify_notification(&body("55"), Some(&header), None, SECRET, 300, now),
            Err(VerifyError::MissingRequestId)
        ));
        assert!(matches!(
            verify_notification(&body("55"), Some(&header), Some(""), SECRET, 300, now),
            Err(VerifyError::MissingRequestId)
        ));
    }

    #[test]
    fn test_missing_data_id_rejected() {
        // likewise a body with no data.id, even when the signature
        // matches the id-less manifest
        let now = 1_704_908_010;
        let manifest = format!("request-id:req-1;ts:{now};");
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(manifest.as_bytes());
        let v1 = hex::encode(mac.finalize().into_bytes());
        let header = format!("ts={now},v1={v1}");

        let no_id = serde_json::to_vec(&serde_json::json!({"type": "payment"})).unwrap();
        assert!(matches!(
            verify_notification(&no_id, Some(&header), Some("req-1"), SECRET, 300, now),
            Err(VerifyError::MissingDataId)
        ));

        let empty_id = serde_json::to_vec(&serde_json::json!({"data": {"id": ""}})).unwrap();
        assert!(matches!(
            verify_notification(&empty_id, Some(&header), Some("req-1"), SECRET, 300, now),
            Err(VerifyError::MissingDataId)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let now = 1_704_908_010;
        let v1 = sign("12345", "req-1", now);
        let header = format!("ts={now},v1={v1}");
        assert!(matches!(
            verify_notification(
                &body("12345"),
                Some(&header),
                Some("req-1"),
                "other_secret",
                300,
                now,
            ),
            Err(VerifyError::Mismatch)
        ));
    }
}
