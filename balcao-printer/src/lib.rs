//! # balcao-printer
//!
//! Thermal printing library for the counter bridge - low-level capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS job framing (init, feed, full cut)
//! - Legacy single-byte code pages (CP850 primary, CP437 fallback)
//! - Windows driver jobs (RAW and TEXT datatypes, via Win32 API)
//! - OS spooler command fallback (Out-Printer / lp)
//! - Printer enumeration and ESC/POS classification
//!
//! Business logic (WHAT to print) stays in application code:
//! - Receipt layout → balcao-server
//!
//! ## Example
//!
//! ```ignore
//! use balcao_printer::{DriverPrinter, Datatype, build_raw_job};
//!
//! let job = build_raw_job("PEDIDO: #42\n")?;
//! let printer = DriverPrinter::new("EPSON TM-T20");
//! let job_id = printer.submit(job.bytes, Datatype::Raw).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::CodePage;
pub use error::{PrintError, PrintResult};
pub use escpos::{FULL_CUT, INIT, RawJob, build_raw_job, is_escpos_printer};
pub use printer::{Datatype, DriverPrinter, spool_file};
