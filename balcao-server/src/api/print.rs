//! Printing endpoints
//!
//! POST /print — format (when orderData is present) and dispatch
//! GET /printers — enumeration diagnostics
//! POST /test-print — deterministic RAW sample with encoding report
//! POST /print-text — force the driver TEXT transport

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use balcao_printer::{Datatype, DriverPrinter, build_raw_job, is_escpos_printer};

use crate::dispatch::TransportKind;
use crate::receipt::{self, Order};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrintRequest {
    pub text: Option<String>,
    #[serde(rename = "orderData")]
    pub order_data: Option<Order>,
    pub printer: Option<String>,
    pub escpos: bool,
}

/// Handle a print request, formatting order data when present
pub async fn handle_print(
    State(state): State<AppState>,
    Json(req): Json<PrintRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    tracing::info!(
        has_order_data = req.order_data.is_some(),
        has_text = req.text.is_some(),
        printer = req.printer.as_deref().unwrap_or("(default)"),
        "Received print request"
    );

    let text = match &req.order_data {
        Some(order) => receipt::format_receipt(order),
        None => req.text.clone().unwrap_or_default(),
    };
    let normalized = receipt::normalize_ascii(&text);

    match state
        .dispatcher
        .dispatch(&normalized, req.printer.as_deref(), req.escpos)
        .await
    {
        Ok(job) => {
            let body = match job.kind {
                TransportKind::Spooler => serde_json::json!({
                    "ok": true,
                    "printer": job.printer,
                    "type": job.kind.as_str(),
                    "file": job.spool_file,
                }),
                _ => serde_json::json!({
                    "ok": true,
                    "jobID": job.job_id,
                    "printer": job.printer,
                    "type": job.kind.as_str(),
                }),
            };
            (StatusCode::OK, Json(body))
        }
        Err(err) => {
            tracing::error!(error = %err, "Print dispatch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "error": err.to_string() })),
            )
        }
    }
}

/// Diagnostic: list installed printers and the OS default
pub async fn list_printers() -> (StatusCode, Json<serde_json::Value>) {
    match DriverPrinter::list() {
        Ok(printers) => {
            let default = DriverPrinter::default_printer().ok().flatten();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "ok": true,
                    "printers": printers,
                    "default": default,
                })),
            )
        }
        Err(err) => {
            tracing::warn!(error = %err, "Printer enumeration failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "error": err.to_string() })),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestPrintRequest {
    pub text: Option<String>,
    pub printer: Option<String>,
    pub escpos: bool,
}

/// Diagnostic: deterministic sample print reporting the encoding and
/// buffer actually sent
pub async fn test_print(
    State(state): State<AppState>,
    Json(req): Json<TestPrintRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let sample = req
        .text
        .clone()
        .unwrap_or_else(|| "Teste Balcao - Linha 1\nLinha 2 ç\n1234567890\n".into());
    let normalized = receipt::normalize_ascii(&format!("{sample}\n---END---\n"));

    let target = match state.dispatcher.resolve_target(req.printer.as_deref()) {
        Ok(t) => t,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "error": err.to_string() })),
            );
        }
    };
    let thermal = is_escpos_printer(&target, req.escpos);

    let (buffer, encoding) = if thermal {
        match build_raw_job(&normalized) {
            Ok(job) => (job.bytes, job.code_page.name()),
            Err(err) => {
                tracing::warn!(error = %err, "ESC/POS build failed for test print");
                (normalized.clone().into_bytes(), "utf8")
            }
        }
    } else {
        (normalized.clone().into_bytes(), "utf8")
    };

    let buffer_len = buffer.len();
    let buffer_hex = hex::encode(&buffer);
    tracing::info!(
        printer = %target,
        encoding,
        buffer_len,
        "Test print buffer built"
    );

    match DriverPrinter::new(&target).submit(buffer, Datatype::Raw).await {
        Ok(job_id) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "jobID": job_id,
                "printer": target,
                "encoding": encoding,
                "bufferLength": buffer_len,
                "bufferHex": &buffer_hex[..buffer_hex.len().min(1000)],
            })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "ok": false,
                "error": err.to_string(),
                "encoding": encoding,
                "bufferLength": buffer_len,
                "bufferHex": &buffer_hex[..buffer_hex.len().min(1000)],
            })),
        ),
    }
}

/// Diagnostic: force the driver TEXT transport
pub async fn print_text(
    State(state): State<AppState>,
    Json(req): Json<TestPrintRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let sample = req
        .text
        .clone()
        .unwrap_or_else(|| "Teste TEXT Balcao\nLinha 2\n".into());
    let normalized = receipt::normalize_ascii(&format!("{sample}\n--END--\n"));

    let target = match state.dispatcher.resolve_target(req.printer.as_deref()) {
        Ok(t) => t,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "error": err.to_string() })),
            );
        }
    };

    let buffer_len = normalized.len();
    tracing::info!(printer = %target, buffer_len, "Sending TEXT job");

    match DriverPrinter::new(&target)
        .submit(normalized.into_bytes(), Datatype::Text)
        .await
    {
        Ok(job_id) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "jobID": job_id,
                "printer": target,
                "type": "TEXT",
            })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "ok": false, "error": err.to_string() })),
        ),
    }
}
