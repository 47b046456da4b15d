//! Money parsing and rendering for receipt values
//!
//! Order payloads carry amounts as numbers or as display strings
//! ("12,34", "R$ 1.234,56"). Parsing is total: anything unparsable
//! resolves to 0 so a malformed field never aborts a receipt.

/// Parse a money string into a float amount
///
/// Accepts `.` or `,` as the decimal separator and strips currency
/// symbols and whitespace first.
pub fn parse_money(v: &str) -> f64 {
    let s = v.trim();
    if s.is_empty() {
        return 0.0;
    }

    let mut cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    // Comma with no dot means comma is the decimal separator
    if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned = cleaned.replacen(',', ".", 1);
    }
    // Remaining commas are thousands separators
    cleaned.retain(|c| c != ',');

    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

/// Parse the longest leading float out of a string
///
/// "12.34abc" parses as 12.34, the way lenient numeric form fields do.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in s.char_indices() {
        match ch {
            '-' if idx == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

/// Render an amount with two decimals and a comma separator
pub fn format_money(n: f64) -> String {
    format!("{:.2}", n).replace('.', ",")
}
