//! Printer transports
//!
//! Supports:
//! - Windows driver jobs (RAW / TEXT datatype, via Win32 spooler API)
//! - OS spooler command fallback (PowerShell Out-Printer on Windows,
//!   `lp` elsewhere)
//!
//! Driver submission only exists on Windows; on other platforms those
//! calls fail with [`PrintError::Unsupported`] so a fallback chain can
//! move on to the spooler command.

use crate::error::{PrintError, PrintResult};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Spooler datatype for driver jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datatype {
    /// Bytes go to the device untouched (ESC/POS)
    Raw,
    /// Driver renders the bytes as plain text
    Text,
}

impl Datatype {
    /// Datatype string as the spooler expects it
    pub fn as_str(self) -> &'static str {
        match self {
            Datatype::Raw => "RAW",
            Datatype::Text => "TEXT",
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver printer addressed by spooler name
#[derive(Debug, Clone)]
pub struct DriverPrinter {
    name: String,
}

impl DriverPrinter {
    /// Create a printer with a specific spooler name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(windows)]
impl DriverPrinter {
    /// Submit a driver job, returning the spooler job id
    ///
    /// The Win32 calls are synchronous, so the write runs in a blocking
    /// task.
    #[instrument(skip(data), fields(printer = %self.name, datatype = %datatype, data_len = data.len()))]
    pub async fn submit(&self, data: Vec<u8>, datatype: Datatype) -> PrintResult<u32> {
        let name = self.name.clone();
        let job_id = tokio::task::spawn_blocking(move || write_job(&name, &data, datatype))
            .await
            .map_err(|e| PrintError::Driver(format!("Task join failed: {}", e)))??;
        info!(job_id, "Driver job submitted");
        Ok(job_id)
    }

    /// List available printers (filters out virtual printers)
    pub fn list() -> PrintResult<Vec<String>> {
        use windows::Win32::Graphics::Printing::{
            EnumPrintersW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_INFO_5W,
        };
        use windows::core::PWSTR;

        unsafe {
            let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                5,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|_| PrintError::Driver("EnumPrintersW failed".to_string()))?;

            let ptr = buf.as_ptr() as *const PRINTER_INFO_5W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            let mut result: Vec<String> = Vec::new();
            for info in slice.iter() {
                if info.pPrinterName.is_null() {
                    continue;
                }
                let name = PWSTR(info.pPrinterName.0).to_string().unwrap_or_default();

                // Filter out virtual printers by port name
                let port = if info.pPortName.is_null() {
                    String::new()
                } else {
                    PWSTR(info.pPortName.0).to_string().unwrap_or_default()
                };

                if !is_virtual_port(&port) {
                    result.push(name);
                }
            }

            Ok(result)
        }
    }

    /// Get the default printer name
    pub fn default_printer() -> PrintResult<Option<String>> {
        use windows::Win32::Graphics::Printing::GetDefaultPrinterW;
        use windows::core::PWSTR;

        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);

            if needed == 0 {
                return Ok(None);
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            let ok = GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed);

            if !ok.as_bool() {
                return Ok(None);
            }

            let name = PWSTR(buf.as_mut_ptr())
                .to_string()
                .map_err(|e| PrintError::Driver(format!("UTF-16 decode failed: {}", e)))?;

            Ok(Some(name))
        }
    }

    /// Resolve a printer name - returns the name if installed, or the
    /// OS default, or the first available printer
    pub fn resolve(name: Option<&str>) -> PrintResult<String> {
        if let Some(name) = name {
            let printers = Self::list()?;
            if printers.iter().any(|p| p == name) {
                return Ok(name.to_string());
            }
            return Err(PrintError::InvalidConfig(format!(
                "Printer not found: {}",
                name
            )));
        }

        if let Some(default) = Self::default_printer()? {
            return Ok(default);
        }

        let printers = Self::list()?;
        printers
            .first()
            .cloned()
            .ok_or_else(|| PrintError::InvalidConfig("No printers available".to_string()))
    }
}

#[cfg(not(windows))]
impl DriverPrinter {
    /// Driver jobs need the Windows spooler; always fails here
    pub async fn submit(&self, _data: Vec<u8>, datatype: Datatype) -> PrintResult<u32> {
        Err(PrintError::Unsupported(format!(
            "{} driver jobs require the Windows spooler",
            datatype
        )))
    }

    /// No driver enumeration off Windows
    pub fn list() -> PrintResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// No OS default printer lookup off Windows
    pub fn default_printer() -> PrintResult<Option<String>> {
        Ok(None)
    }

    /// Resolve a printer name - the caller-supplied name is trusted
    /// as-is (the spooler command validates it)
    pub fn resolve(name: Option<&str>) -> PrintResult<String> {
        name.map(str::to_string).ok_or_else(|| {
            PrintError::InvalidConfig("No printer name given and no OS default".to_string())
        })
    }
}

#[cfg(windows)]
fn is_virtual_port(port: &str) -> bool {
    let p = port.to_lowercase();
    p == "file:"
        || p == "portprompt:"
        || p == "xpsport:"
        || p.starts_with("onenote")
        || p == "nul:"
        || p.starts_with("wfsport:")
}

#[cfg(windows)]
fn write_job(name: &str, data: &[u8], datatype: Datatype) -> PrintResult<u32> {
    use core::ffi::c_void;
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
        StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    unsafe {
        let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
        let name_w = to_wide(name);

        OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
            .map_err(|_| PrintError::Driver("OpenPrinterW failed".to_string()))?;

        let doc_name_w = to_wide("Pedido Balcao");
        let datatype_w = to_wide(datatype.as_str());
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        let job_id = StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W);
        if job_id == 0 {
            let _ = ClosePrinter(handle);
            return Err(PrintError::Driver("StartDocPrinter failed".to_string()));
        }

        if !StartPagePrinter(handle).as_bool() {
            let _ = EndDocPrinter(handle);
            let _ = ClosePrinter(handle);
            return Err(PrintError::Driver("StartPagePrinter failed".to_string()));
        }

        let mut written: u32 = 0;
        let ok = WritePrinter(
            handle,
            data.as_ptr() as *const c_void,
            data.len() as u32,
            &mut written,
        );

        let _ = EndPagePrinter(handle);
        let _ = EndDocPrinter(handle);
        let _ = ClosePrinter(handle);

        if !ok.as_bool() {
            return Err(PrintError::Driver("WritePrinter failed".to_string()));
        }

        if written != data.len() as u32 {
            return Err(PrintError::Driver("Incomplete write".to_string()));
        }

        Ok(job_id)
    }
}

/// Pipe a text file to a printer through the OS print utility
///
/// Last resort of the fallback chain. The command is bounded by a
/// deadline; a wedged spooler counts as a failure once it elapses.
#[instrument(skip(path), fields(printer = %printer))]
pub async fn spool_file(printer: &str, path: &Path, deadline: Duration) -> PrintResult<()> {
    let mut cmd = spool_command(printer, path);

    let output = tokio::time::timeout(deadline, cmd.output())
        .await
        .map_err(|_| PrintError::Timeout(format!("Spooler command exceeded {:?}", deadline)))??;

    if output.status.success() {
        info!("Spooler job accepted");
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(PrintError::Spooler(format!(
            "{}: {}",
            output.status,
            stderr.trim()
        )))
    }
}

#[cfg(windows)]
fn spool_command(printer: &str, path: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("powershell");
    cmd.arg("-NoProfile").arg("-Command").arg(format!(
        "Get-Content -Raw -LiteralPath '{}' | Out-Printer -Name \"{}\"",
        path.display(),
        printer
    ));
    cmd
}

#[cfg(not(windows))]
fn spool_command(printer: &str, path: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("lp");
    cmd.arg("-d").arg(printer).arg(path);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_strings() {
        assert_eq!(Datatype::Raw.as_str(), "RAW");
        assert_eq!(Datatype::Text.as_str(), "TEXT");
    }

    #[test]
    fn test_printer_name() {
        let printer = DriverPrinter::new("POS-80C");
        assert_eq!(printer.name(), "POS-80C");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_resolve_off_windows() {
        assert_eq!(DriverPrinter::resolve(Some("POS-80C")).unwrap(), "POS-80C");
        assert!(DriverPrinter::resolve(None).is_err());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_submit_unsupported_off_windows() {
        let printer = DriverPrinter::new("POS-80C");
        let err = printer.submit(vec![0x1B, 0x40], Datatype::Raw).await;
        assert!(matches!(err, Err(PrintError::Unsupported(_))));
    }
}
