//! Print dispatch with ordered transport fallback
//!
//! A dispatch walks the chain raw ESC/POS driver job → driver TEXT
//! job → OS spooler command, stopping at the first transport that
//! accepts the job. Dispatches to the same printer are serialized so
//! two orders never interleave on one device.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use balcao_printer::{
    Datatype, DriverPrinter, PrintError, build_raw_job, is_escpos_printer, spool_file,
};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Transport that ended up carrying the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Raw,
    Text,
    Spooler,
}

impl TransportKind {
    /// Label the desktop shell matches on in print responses
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Raw => "RAW",
            TransportKind::Text => "TEXT",
            TransportKind::Spooler => "powershell-out-printer",
        }
    }
}

/// Outcome of a successful dispatch
#[derive(Debug, Clone)]
pub struct JobReceipt {
    pub printer: String,
    pub kind: TransportKind,
    /// Spooler job id for driver jobs
    pub job_id: Option<u32>,
    /// Encoding the body went out in ("cp850", "cp437" or "utf8")
    pub encoding: &'static str,
    pub buffer_len: usize,
    /// Temp file handed to the spooler command, when that path was used
    pub spool_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every transport in the chain failed
    #[error("All transports failed for '{printer}': {raw} | {text} | {spooler}")]
    AllFailed {
        printer: String,
        raw: String,
        text: String,
        spooler: String,
    },

    /// The target printer could not be resolved
    #[error(transparent)]
    Printer(#[from] PrintError),
}

/// Shared print dispatcher
pub struct Dispatcher {
    default_printer: Option<String>,
    spooler_timeout: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Dispatcher {
    pub fn new(default_printer: Option<String>, spooler_timeout: Duration) -> Self {
        Self {
            default_printer,
            spooler_timeout,
            locks: DashMap::new(),
        }
    }

    /// Resolve the target printer: request > configured default > OS default
    pub fn resolve_target(&self, printer: Option<&str>) -> Result<String, PrintError> {
        let requested = printer.or(self.default_printer.as_deref());
        DriverPrinter::resolve(requested)
    }

    fn lock_for(&self, printer: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(printer.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Send normalized receipt text through the fallback chain
    #[instrument(skip(self, text), fields(escpos_flag = escpos))]
    pub async fn dispatch(
        &self,
        text: &str,
        printer: Option<&str>,
        escpos: bool,
    ) -> Result<JobReceipt, DispatchError> {
        let target = self.resolve_target(printer)?;
        let lock = self.lock_for(&target);
        let _guard = lock.lock().await;

        let driver = DriverPrinter::new(&target);
        let thermal = is_escpos_printer(&target, escpos);

        // 1. RAW driver job: framed ESC/POS for thermal targets, plain
        //    bytes otherwise. A body that fits neither code page drops
        //    the target back to plain bytes, like a non-thermal one.
        let (raw_bytes, raw_encoding) = if thermal {
            match build_raw_job(text) {
                Ok(job) => (job.bytes, job.code_page.name()),
                Err(err) => {
                    warn!(error = %err, "ESC/POS build failed, sending plain bytes");
                    (text.as_bytes().to_vec(), "utf8")
                }
            }
        } else {
            (text.as_bytes().to_vec(), "utf8")
        };
        let raw_len = raw_bytes.len();

        let raw_err = match driver.submit(raw_bytes, Datatype::Raw).await {
            Ok(job_id) => {
                info!(printer = %target, job_id, encoding = raw_encoding, buffer_len = raw_len, "Dispatched (RAW)");
                return Ok(JobReceipt {
                    printer: target,
                    kind: TransportKind::Raw,
                    job_id: Some(job_id),
                    encoding: raw_encoding,
                    buffer_len: raw_len,
                    spool_file: None,
                });
            }
            Err(err) => {
                warn!(printer = %target, encoding = raw_encoding, buffer_len = raw_len, error = %err, "RAW transport failed");
                err
            }
        };

        // 2. TEXT driver job: always UTF-8, trailing feed when the RAW
        //    attempt was an ESC/POS buffer
        let text_body = if thermal {
            format!("{text}\n\n")
        } else {
            text.to_string()
        };
        let text_len = text_body.len();

        let text_err = match driver.submit(text_body.into_bytes(), Datatype::Text).await {
            Ok(job_id) => {
                info!(printer = %target, job_id, buffer_len = text_len, "Dispatched (TEXT)");
                return Ok(JobReceipt {
                    printer: target,
                    kind: TransportKind::Text,
                    job_id: Some(job_id),
                    encoding: "utf8",
                    buffer_len: text_len,
                    spool_file: None,
                });
            }
            Err(err) => {
                warn!(printer = %target, encoding = "utf8", buffer_len = text_len, error = %err, "TEXT transport failed");
                err
            }
        };

        // 3. Spooler command on a temp file
        match self.spool(&target, text).await {
            Ok(path) => {
                info!(printer = %target, file = %path.display(), "Dispatched (spooler)");
                Ok(JobReceipt {
                    printer: target,
                    kind: TransportKind::Spooler,
                    job_id: None,
                    encoding: "utf8",
                    buffer_len: text.len(),
                    spool_file: Some(path),
                })
            }
            Err(err) => {
                warn!(printer = %target, encoding = "utf8", buffer_len = text.len(), error = %err, "Spooler transport failed");
                Err(DispatchError::AllFailed {
                    printer: target,
                    raw: raw_err.to_string(),
                    text: text_err.to_string(),
                    spooler: err.to_string(),
                })
            }
        }
    }

    async fn spool(&self, printer: &str, text: &str) -> Result<PathBuf, PrintError> {
        let mut tmp = tempfile::Builder::new()
            .prefix("pedido_print_")
            .suffix(".txt")
            .tempfile()?;
        tmp.write_all(text.as_bytes())?;

        // The spooler may read the file after the command returns;
        // keep it on disk like any other print artifact
        let (_file, path) = tmp.keep().map_err(|e| PrintError::Io(e.error))?;

        spool_file(printer, &path, self.spooler_timeout).await?;
        Ok(path)
    }
}
