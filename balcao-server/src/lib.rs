//! balcao-server — local print bridge for the counter desktop shell
//!
//! Loopback HTTP service that:
//! - Formats structured order data into 32-column thermal receipts
//! - Dispatches text through an ordered transport chain
//!   (raw ESC/POS → driver TEXT job → OS spooler command)
//! - Verifies MercadoPago webhook notifications (HMAC-SHA256 manifest,
//!   replay window) before acknowledging them

pub mod api;
pub mod config;
pub mod dispatch;
pub mod receipt;
pub mod state;
pub mod webhook;
