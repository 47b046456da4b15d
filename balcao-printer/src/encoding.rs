//! Legacy single-byte code pages for thermal printers
//!
//! Most Latin-American receipt printers ship with the OEM code pages
//! CP850 (Latin-1 box drawing variant) or CP437 (original IBM PC set).
//! This module maps UTF-8 text onto those pages: ASCII passes through
//! unchanged, the high half (0x80-0xFF) goes through a lookup table,
//! anything else is an encoding error so the caller can fall back or
//! drop to a plain-text transport.

use crate::error::{PrintError, PrintResult};

/// Supported printer code pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// DOS Latin-1 (primary for pt-BR receipts)
    Cp850,
    /// Original IBM PC page (fallback)
    Cp437,
}

impl CodePage {
    /// Canonical name as printers and drivers report it
    pub fn name(self) -> &'static str {
        match self {
            CodePage::Cp850 => "cp850",
            CodePage::Cp437 => "cp437",
        }
    }

    fn high_table(self) -> &'static [char; 128] {
        match self {
            CodePage::Cp850 => &CP850_HIGH,
            CodePage::Cp437 => &CP437_HIGH,
        }
    }

    /// Encode a string to this code page
    ///
    /// Fails on the first character with no mapping.
    pub fn encode(self, s: &str) -> PrintResult<Vec<u8>> {
        let table = self.high_table();
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            if (ch as u32) < 0x80 {
                out.push(ch as u8);
                continue;
            }
            match table.iter().position(|&t| t == ch) {
                Some(idx) => out.push(0x80 + idx as u8),
                None => {
                    return Err(PrintError::Encoding {
                        code_page: self.name(),
                        ch,
                    });
                }
            }
        }
        Ok(out)
    }
}

impl std::fmt::Display for CodePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// CP850 bytes 0x80-0xFF
const CP850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐', //
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤', //
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀', //
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´', //
    '\u{AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{A0}',
];

/// CP437 bytes 0x80-0xFF
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{A0}',
];
