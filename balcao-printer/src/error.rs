//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Character cannot be represented in the target code page
    #[error("Unmappable character {ch:?} for {code_page}")]
    Encoding { code_page: &'static str, ch: char },

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout waiting for the spooler
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Operation not available on this platform
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Driver job submission error
    #[error("Driver error: {0}")]
    Driver(String),

    /// Spooler command error
    #[error("Spooler error: {0}")]
    Spooler(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
