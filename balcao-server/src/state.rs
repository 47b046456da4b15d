//! Application state for balcao-server

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::Dispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Print dispatcher (fallback chain + per-printer locks)
    pub dispatcher: Arc<Dispatcher>,
    /// MercadoPago webhook signing secret, when configured
    pub webhook_secret: Option<String>,
    /// Webhook replay window in seconds
    pub webhook_tolerance_secs: i64,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: &Config) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(
                config.default_printer.clone(),
                Duration::from_millis(config.spooler_timeout_ms),
            )),
            webhook_secret: config.webhook_secret.clone(),
            webhook_tolerance_secs: config.webhook_tolerance_secs,
        }
    }
}
