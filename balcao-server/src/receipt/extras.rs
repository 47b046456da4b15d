//! Legacy plain-text extras parser
//!
//! Older storefront exports attach item extras as a text blob:
//!
//! ```text
//! Molhos:
//! Ketchup (2x)
//! 2x Maionese
//! Barbecue x3
//! ```
//!
//! A line ending the group label with `:` opens a group; following
//! lines are items in that group until the next label. Quantity
//! markers come in three shapes: `(2x)`, a leading `2x `, and a
//! trailing `x2`. Lines before any group label are dropped.

/// A parsed group of extras
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrasGroup {
    pub name: String,
    pub items: Vec<ParsedExtra>,
}

/// One extra with its quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExtra {
    pub name: String,
    pub quantity: u32,
}

enum State {
    OutsideGroup,
    InsideGroup,
}

/// Parse a legacy extras blob into groups
pub fn parse_legacy_extras(text: &str) -> Vec<ExtrasGroup> {
    let mut groups: Vec<ExtrasGroup> = Vec::new();
    let mut state = State::OutsideGroup;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains(':') {
            groups.push(ExtrasGroup {
                name: line.replacen(':', "", 1).trim().to_string(),
                items: Vec::new(),
            });
            state = State::InsideGroup;
            continue;
        }

        match state {
            State::OutsideGroup => {}
            State::InsideGroup => {
                if let Some(item) = parse_item_line(line)
                    && let Some(group) = groups.last_mut()
                {
                    group.items.push(item);
                }
            }
        }
    }

    groups
}

fn parse_item_line(line: &str) -> Option<ParsedExtra> {
    let mut quantity = 1;
    let mut rest = line.to_string();

    // Parenthesized marker anywhere: "(2x)"
    if let Some((qty, stripped)) = strip_paren_qty(&rest) {
        quantity = qty;
        rest = stripped;
    } else if let Some((qty, stripped)) = strip_leading_qty(&rest) {
        // Leading marker: "2x Maionese"
        quantity = qty;
        rest = stripped;
    }

    // Trailing marker: "Barbecue x3"
    if let Some((qty, stripped)) = strip_trailing_qty(&rest) {
        quantity = qty;
        rest = stripped;
    }

    let name = rest.trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(ParsedExtra { name, quantity })
}

/// Find and remove a "( 2x )" marker, returning the quantity
fn strip_paren_qty(line: &str) -> Option<(u32, String)> {
    let bytes = line.as_bytes();
    for (start, _) in line.char_indices().filter(|&(_, c)| c == '(') {
        let mut i = start + 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits_start {
            continue;
        }
        let digits_end = i;
        if i >= bytes.len() || !matches!(bytes[i], b'x' | b'X') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b')' {
            continue;
        }
        let qty: u32 = line[digits_start..digits_end].parse().ok()?;
        let mut stripped = String::with_capacity(line.len());
        stripped.push_str(&line[..start]);
        stripped.push_str(&line[i + 1..]);
        return Some((qty.max(1), stripped.trim().to_string()));
    }
    None
}

/// Remove a leading "2x " marker
fn strip_leading_qty(line: &str) -> Option<(u32, String)> {
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let rest = &line[digits_end..];
    let after_x = rest.strip_prefix(['x', 'X'])?;
    let stripped = after_x.strip_prefix(char::is_whitespace)?;
    let qty: u32 = line[..digits_end].parse().ok()?;
    Some((qty.max(1), stripped.trim().to_string()))
}

/// Remove a trailing "x2" marker
fn strip_trailing_qty(line: &str) -> Option<(u32, String)> {
    let trimmed = line.trim_end();
    let digits_start = trimmed.rfind(|c: char| !c.is_ascii_digit())? + 1;
    if digits_start >= trimmed.len() {
        return None;
    }
    let before = trimmed[..digits_start].trim_end();
    let stripped = before.strip_suffix(['x', 'X'])?;
    let qty: u32 = trimmed[digits_start..].parse().ok()?;
    Some((qty.max(1), stripped.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group() {
        let groups = parse_legacy_extras("Molhos:\nKetchup\nMaionese");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Molhos");
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[0].items[0].name, "Ketchup");
        assert_eq!(groups[0].items[0].quantity, 1);
    }

    #[test]
    fn test_quantity_markers() {
        let groups = parse_legacy_extras("Adicionais:\nKetchup (2x)\n3x Maionese\nBarbecue x4");
        let items = &groups[0].items;
        assert_eq!(
            items[0],
            ParsedExtra {
                name: "Ketchup".into(),
                quantity: 2
            }
        );
        assert_eq!(
            items[1],
            ParsedExtra {
                name: "Maionese".into(),
                quantity: 3
            }
        );
        assert_eq!(
            items[2],
            ParsedExtra {
                name: "Barbecue".into(),
                quantity: 4
            }
        );
    }

    #[test]
    fn test_multiple_groups() {
        let groups = parse_legacy_extras("Molhos:\nKetchup\nBordas:\nCatupiry");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].items.len(), 1);
        assert_eq!(groups[1].name, "Bordas");
        assert_eq!(groups[1].items[0].name, "Catupiry");
    }

    #[test]
    fn test_lines_before_any_group_are_dropped() {
        let groups = parse_legacy_extras("orfao\nMolhos:\nKetchup");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 1);
    }

    #[test]
    fn test_blank_lines_and_empty_markers() {
        let groups = parse_legacy_extras("Molhos:\n\n  \n(2x)\nKetchup");
        // "(2x)" alone leaves no item name
        assert_eq!(groups[0].items.len(), 1);
        assert_eq!(groups[0].items[0].name, "Ketchup");
    }

    #[test]
    fn test_colon_only_first_is_removed() {
        let groups = parse_legacy_extras("Obs: extra:\nCebola");
        assert_eq!(groups[0].name, "Obs extra:");
    }
}
