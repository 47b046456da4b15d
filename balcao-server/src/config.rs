//! Bridge configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port on loopback (env: HTTP_PORT)
    pub http_port: u16,
    /// Default target printer when the request names none (env: PRINT_PRINTER)
    pub default_printer: Option<String>,
    /// MercadoPago webhook signing secret (env: MERCADOPAGO_WEBHOOK_SECRET)
    pub webhook_secret: Option<String>,
    /// Webhook replay window in seconds (env: WEBHOOK_TOLERANCE_SECS)
    pub webhook_tolerance_secs: i64,
    /// Deadline for the OS spooler command in ms (env: SPOOLER_TIMEOUT_MS)
    pub spooler_timeout_ms: u64,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// The webhook secret may stay unset in development (the endpoint
    /// answers 500 until it is configured) but must be present
    /// everywhere else.
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let webhook_secret = match std::env::var("MERCADOPAGO_WEBHOOK_SECRET") {
            Ok(v) if !v.is_empty() => Some(v),
            _ => {
                if environment != "development" {
                    return Err(format!(
                        "MERCADOPAGO_WEBHOOK_SECRET must be set in {environment} environment"
                    )
                    .into());
                }
                None
            }
        };

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3420),
            default_printer: std::env::var("PRINT_PRINTER")
                .ok()
                .filter(|s| !s.is_empty()),
            webhook_secret,
            webhook_tolerance_secs: std::env::var("WEBHOOK_TOLERANCE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            spooler_timeout_ms: std::env::var("SPOOLER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            environment,
        })
    }
}
