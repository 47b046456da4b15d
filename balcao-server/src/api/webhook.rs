//! MercadoPago webhook endpoint
//!
//! POST /webhook/mercadopago — raw body for HMAC verification.
//!
//! Responses: 500 when no secret is configured, 401 when verification
//! fails, 200 once the notification is accepted. Downstream handling
//! errors still answer 200 so the sender does not retry-storm a local
//! bridge.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::state::AppState;
use crate::webhook::verify_notification;

/// Handle an incoming MercadoPago notification
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let secret = match state.webhook_secret.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => {
            tracing::error!(
                "MERCADOPAGO_WEBHOOK_SECRET not configured, rejecting webhook"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "ok": false,
                    "error": "Webhook secret não configurado no servidor",
                })),
            );
        }
    };

    let x_signature = headers.get("x-signature").and_then(|v| v.to_str().ok());
    let x_request_id = headers.get("x-request-id").and_then(|v| v.to_str().ok());

    let verified = match verify_notification(
        &body,
        x_signature,
        x_request_id,
        secret,
        state.webhook_tolerance_secs,
        chrono::Utc::now().timestamp(),
    ) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(
                error = %err,
                has_signature = x_signature.is_some(),
                has_request_id = x_request_id.is_some(),
                "Webhook rejected"
            );
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "ok": false,
                    "error": "Assinatura do webhook inválida",
                })),
            );
        }
    };

    // Route by notification type; the bridge only logs and
    // acknowledges, order state lives in the shell
    let notification_type = verified.body["type"]
        .as_str()
        .or_else(|| verified.body["action"].as_str())
        .unwrap_or("");

    match notification_type {
        "payment" => {
            tracing::info!(data_id = %verified.data_id, "Payment notification received");
        }
        "merchant_order" => {
            tracing::info!(data_id = %verified.data_id, "Merchant order notification received");
        }
        other => {
            tracing::info!(
                notification_type = other,
                data_id = %verified.data_id,
                "Notification received"
            );
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "ok": true,
            "message": "Webhook processado com sucesso",
            "type": notification_type,
            "dataId": verified.data_id,
        })),
    )
}
