//! API routes for balcao-server

pub mod health;
pub mod print;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Printing surface (receipt formatting + transport diagnostics)
    let printing = Router::new()
        .route("/print", post(print::handle_print))
        .route("/printers", get(print::list_printers))
        .route("/test-print", post(print::test_print))
        .route("/print-text", post(print::print_text));

    // MercadoPago webhook (signature-verified, raw body)
    let webhook = Router::new().route("/webhook/mercadopago", post(webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(printing)
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
