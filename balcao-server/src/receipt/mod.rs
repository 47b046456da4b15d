//! Receipt domain: payload model, money handling, 32-column layout

pub mod extras;
pub mod format;
pub mod model;
pub mod money;

pub use format::{RECEIPT_WIDTH, format_receipt, normalize_ascii};
pub use model::Order;
