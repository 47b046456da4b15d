//! ESC/POS job framing and printer classification
//!
//! A raw job for a thermal target is always framed the same way:
//! initialize, body text in a legacy code page, two blank feed lines,
//! full cut.

use crate::encoding::CodePage;
use crate::error::PrintResult;
use tracing::debug;

/// Initialize printer (ESC @)
pub const INIT: [u8; 2] = [0x1B, 0x40];

/// Full paper cut (GS V 0)
pub const FULL_CUT: [u8; 3] = [0x1D, 0x56, 0x00];

/// A framed ESC/POS byte job and the code page its body ended up in
#[derive(Debug, Clone)]
pub struct RawJob {
    pub bytes: Vec<u8>,
    pub code_page: CodePage,
}

/// Build a complete ESC/POS job from receipt text
///
/// The body is encoded as CP850; if any character has no CP850 slot the
/// whole body is retried as CP437. Two trailing feed lines give the cut
/// some clearance.
pub fn build_raw_job(text: &str) -> PrintResult<RawJob> {
    let body = format!("{text}\n\n");
    let (encoded, code_page) = match CodePage::Cp850.encode(&body) {
        Ok(bytes) => (bytes, CodePage::Cp850),
        Err(err) => {
            debug!(error = %err, "CP850 encode failed, retrying as CP437");
            (CodePage::Cp437.encode(&body)?, CodePage::Cp437)
        }
    };

    let mut bytes = Vec::with_capacity(INIT.len() + encoded.len() + FULL_CUT.len());
    bytes.extend_from_slice(&INIT);
    bytes.extend_from_slice(&encoded);
    bytes.extend_from_slice(&FULL_CUT);

    Ok(RawJob { bytes, code_page })
}

/// Decide whether a printer should receive ESC/POS raw jobs
///
/// Matches common thermal printer naming (POS-80, Star, Epson TM-*)
/// case-insensitively; an explicit flag from the caller always wins.
pub fn is_escpos_printer(name: &str, escpos_flag: bool) -> bool {
    if escpos_flag {
        return true;
    }
    let lower = name.to_lowercase();
    ["pos", "star", "epson", "thermal", "tm-"]
        .iter()
        .any(|token| lower.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_framing() {
        let job = build_raw_job("HELLO").unwrap();
        assert_eq!(&job.bytes[..2], &INIT);
        assert_eq!(&job.bytes[job.bytes.len() - 3..], &FULL_CUT);
        assert_eq!(&job.bytes[2..job.bytes.len() - 3], b"HELLO\n\n");
        assert_eq!(job.code_page, CodePage::Cp850);
    }

    #[test]
    fn test_cp437_fallback() {
        // ≈ only exists in CP437
        let job = build_raw_job("x \u{2248} y").unwrap();
        assert_eq!(job.code_page, CodePage::Cp437);
        assert_eq!(&job.bytes[..2], &INIT);
    }

    #[test]
    fn test_unmappable_in_both_pages() {
        assert!(build_raw_job("汉字").is_err());
    }

    #[test]
    fn test_classification_by_name() {
        assert!(is_escpos_printer("EPSON TM-T20III", false));
        assert!(is_escpos_printer("POS-80C", false));
        assert!(is_escpos_printer("Star TSP100", false));
        assert!(is_escpos_printer("Generic Thermal", false));
        assert!(!is_escpos_printer("HP LaserJet 1020", false));
        assert!(!is_escpos_printer("Brother DCP-L2540", false));
    }

    #[test]
    fn test_classification_flag_wins() {
        assert!(is_escpos_printer("HP LaserJet 1020", true));
    }
}
