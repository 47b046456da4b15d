//! 32-column receipt layout
//!
//! Builds the counter receipt line by line: centered header, order
//! identification, customer block, priced item lines with wrapping,
//! payment banner and totals. The finished text is normalized to plain
//! ASCII at the very end so the layout is computed on the original
//! names (accent stripping never changes a line's width, dropping a
//! character would).

use chrono::NaiveDateTime;
use unicode_normalization::UnicodeNormalization;

use super::extras::parse_legacy_extras;
use super::model::{ExtraItem, ExtrasInput, LineItem, MoneyInput, Order, QtyInput};
use super::money::format_money;

/// Paper width in characters (58 mm thermal roll)
pub const RECEIPT_WIDTH: usize = 32;

/// Columns available for an item label on a priced line
const MAX_NAME_LEN: usize = 22;

/// Columns reserved under the price on continuation lines
const VALUE_SPACE: usize = 10;

const SEPARATOR: &str = "-------------------------------";

/// Decompose to NFD and keep ASCII only
///
/// Turns "Açaí" into "Acai"; characters with no ASCII base letter are
/// dropped.
pub fn normalize_ascii(text: &str) -> String {
    text.nfd().filter(char::is_ascii).collect()
}

/// Center text within the paper width, padding both sides
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let padding = width.saturating_sub(len);
    let left = padding / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(padding - left))
}

/// Render an order date for the receipt
///
/// The shell sends "DD-MM-YYYY HH:MM"; anything else is tried as
/// RFC 3339 and otherwise printed verbatim.
fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    for pattern in ["%d-%m-%Y %H:%M", "%d-%m-%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return dt.format("%d/%m/%Y %H:%M").to_string();
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return dt.format("%d/%m/%Y %H:%M").to_string();
    }
    raw.to_string()
}

/// Lay out a labeled price line, wrapping long labels
///
/// Short labels share one line with the right-aligned price. Longer
/// labels put their first 22 columns on the priced line and continue
/// below, keeping a two-space indent for indented extras and leaving
/// the price columns blank.
fn money_line(label: &str, amount: f64) -> Vec<String> {
    let price = format!("R$ {}", format_money(amount));
    let chars: Vec<char> = label.chars().collect();

    if chars.len() <= MAX_NAME_LEN {
        let space = RECEIPT_WIDTH
            .saturating_sub(chars.len() + price.len())
            .max(1);
        return vec![format!("{label}{}{price}", " ".repeat(space))];
    }

    let mut lines = Vec::new();
    let first: String = chars[..MAX_NAME_LEN].iter().collect();
    let space = RECEIPT_WIDTH
        .saturating_sub(MAX_NAME_LEN + price.len())
        .max(1);
    lines.push(format!("{first}{}{price}", " ".repeat(space)));

    let indent = if label.starts_with("  ") { "  " } else { "" };
    let part_len = MAX_NAME_LEN - indent.len();
    let mut idx = MAX_NAME_LEN;
    while idx < chars.len() {
        let end = (idx + part_len).min(chars.len());
        let part: String = chars[idx..end].iter().collect();
        lines.push(format!("{indent}{part}{}", " ".repeat(VALUE_SPACE)));
        idx = end;
    }
    lines
}

fn clean_name(name: &str) -> String {
    // Storefront exports leak the en-dash HTML entity
    name.replace("&#8211;", "-").trim().to_string()
}

/// Extract a "2 x " / "2x " quantity prefix embedded in a product name
fn split_embedded_qty(name: &str) -> Option<(u32, &str)> {
    let digits_end = name.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let rest = name[digits_end..].trim_start();
    let rest = rest.strip_prefix(['x', 'X'])?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    if rest.is_empty() {
        return None;
    }
    let qty: u32 = name[..digits_end].parse().ok()?;
    Some((qty, rest))
}

/// Resolve an item's display name and effective quantity
///
/// An explicit quantity field wins over a quantity embedded in the
/// name; the embedded marker is stripped from the name either way.
fn item_name_and_qty(item: &LineItem) -> (String, u32) {
    let raw = clean_name(item.product_name.as_deref().unwrap_or(""));
    let (embedded, name) = match split_embedded_qty(&raw) {
        Some((q, rest)) => (Some(q).filter(|&q| q > 0), rest.to_string()),
        None => (None, raw.clone()),
    };
    let qty = item
        .quantity
        .as_ref()
        .and_then(QtyInput::value)
        .or(embedded)
        .unwrap_or(1);
    (name, qty)
}

fn non_empty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}

fn amount_of(opt: &Option<MoneyInput>) -> f64 {
    opt.as_ref().map(MoneyInput::amount).unwrap_or(0.0)
}

fn render_structured_extras(lines: &mut Vec<String>, extras: &[ExtraItem]) {
    for extra in extras {
        let eqty = extra
            .quantity
            .as_ref()
            .and_then(QtyInput::value)
            .unwrap_or(1);
        let name = extra.name.as_deref().unwrap_or("");
        let label = if eqty > 1 {
            format!("  {eqty} x {name}")
        } else {
            format!("  {name}")
        };
        let price = extra.price.as_ref().map(MoneyInput::amount).unwrap_or(0.0) * eqty as f64;
        lines.extend(money_line(&label, price));
    }
}

/// Build the full receipt text for an order
///
/// Total over malformed input: missing or garbled optional fields
/// drop their line or fall back, they never fail the receipt.
pub fn format_receipt(order: &Order) -> String {
    let width = RECEIPT_WIDTH;
    let mut lines: Vec<String> = Vec::new();

    lines.push(center("* CARDÁPIO PRÓPRIO *", width));
    if let Some(name) = non_empty(&order.store_name) {
        lines.push(center(name, width));
    }
    lines.push(SEPARATOR.into());

    let id = order
        .id
        .as_ref()
        .map(|i| i.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "(sem id)".into());
    lines.push(center(&format!("PEDIDO: #{id}"), width));
    lines.push(SEPARATOR.into());

    let date = order.date.as_deref().map(format_date).unwrap_or_default();
    lines.push(format!("Data: {date}"));
    lines.push("Entrega prevista: Cfg depois".into());

    if let Some(locator) = order.locator() {
        let compact: Vec<char> = locator.chars().filter(|c| !c.is_whitespace()).collect();
        let chunks: Vec<String> = compact
            .chunks(4)
            .map(|c| c.iter().collect::<String>())
            .collect();
        lines.push(format!("Localizador: {}", chunks.join(" ")));
    }

    if let Some(name) = non_empty(&order.customer_name) {
        lines.push(name.to_string());
    }
    if let Some(phone) = non_empty(&order.customer_phone) {
        lines.push(format!("Tel. {phone}"));
    }
    if let Some(addr) = non_empty(&order.address) {
        let number = order
            .address_number
            .as_ref()
            .map(|n| n.to_string())
            .filter(|s| !s.is_empty());
        match number {
            Some(n) => lines.push(format!("Endereço: {addr}, {n}")),
            None => lines.push(format!("Endereço: {addr}")),
        }
    }
    if let Some(hood) = non_empty(&order.neighborhood) {
        lines.push(format!("Bairro: {hood}"));
    }
    if let Some(reference) = non_empty(&order.reference).filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Ref: {reference}"));
    }
    let city = non_empty(&order.city);
    let state = non_empty(&order.state);
    if city.is_some() || state.is_some() {
        let sep = if city.is_some() && state.is_some() {
            ", "
        } else {
            ""
        };
        lines.push(format!(
            "Cidade: {}{sep}{}",
            city.unwrap_or(""),
            state.unwrap_or("")
        ));
    }
    if let Some(zip) = order
        .zipcode
        .as_ref()
        .map(|z| z.to_string())
        .filter(|s| !s.is_empty())
    {
        lines.push(format!("CEP: {zip}"));
    }
    lines.push(SEPARATOR.into());

    let resolved: Vec<(String, u32, &LineItem)> = order
        .items
        .iter()
        .map(|item| {
            let (name, qty) = item_name_and_qty(item);
            (name, qty, item)
        })
        .collect();
    let total_items: u32 = resolved.iter().map(|(_, qty, _)| qty).sum();
    lines.push(format!("ITENS DO PEDIDO ({total_items})"));

    for (name, qty, item) in &resolved {
        let label = if *qty > 1 {
            format!("{qty} x {name}")
        } else {
            name.clone()
        };
        let unit = item
            .product_price
            .as_ref()
            .filter(|m| m.is_set())
            .or(item.total.as_ref().filter(|m| m.is_set()))
            .map(MoneyInput::amount)
            .unwrap_or(0.0);
        let item_total = match item.total.as_ref().filter(|m| m.is_set()) {
            Some(total) => total.amount(),
            None => unit * f64::from(*qty),
        };
        lines.extend(money_line(&label, item_total));

        match &item.product_extras {
            Some(ExtrasInput::Legacy(text)) => {
                for group in parse_legacy_extras(text) {
                    lines.push(format!("  {}:", group.name));
                    for extra in &group.items {
                        let label = if extra.quantity > 1 {
                            format!("    {}x {}", extra.quantity, extra.name)
                        } else {
                            format!("    {}", extra.name)
                        };
                        lines.extend(money_line(&label, 0.0));
                    }
                }
            }
            Some(ExtrasInput::List(list)) => render_structured_extras(&mut lines, list),
            Some(ExtrasInput::Grouped(grouped)) => {
                let flat: Vec<ExtraItem> = grouped
                    .groups
                    .iter()
                    .flat_map(|group| group.items.clone())
                    .collect();
                render_structured_extras(&mut lines, &flat);
            }
            None => {}
        }
    }
    lines.push(SEPARATOR.into());

    let status = order
        .payment_status
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    match status.as_str() {
        "paid" => lines.push(center("*Pagamento realizado*", width)),
        "waiting" => lines.push(center("*Pagamento na entrega*", width)),
        "failed" => lines.push(center("*Pagamento falhou*", width)),
        _ => {}
    }
    lines.push(SEPARATOR.into());

    let subtotal = amount_of(&order.subtotal);
    let delivery = amount_of(&order.delivery_price);
    let coupon_discount = amount_of(&order.coupon_discount);
    let total = match order.total.as_ref().filter(|m| m.is_set()) {
        Some(total) => total.amount(),
        None => subtotal + delivery - coupon_discount,
    };

    lines.push("0".repeat(52));
    lines.push(format!("{:<22}R$ {}", "Valor total do", format_money(subtotal)));
    lines.push("pedido:".into());
    lines.push(format!(
        "{:<22}R$ {}",
        "Taxa de entrega:",
        format_money(delivery)
    ));
    if let Some(coupon) = non_empty(&order.coupon_name) {
        lines.push(format!("{:<22}{coupon}", "Cupom:"));
    }
    if coupon_discount > 0.0 {
        lines.push(format!(
            "{:<22}R$ {}",
            "Desconto cupom",
            format_money(coupon_discount)
        ));
    }
    lines.push(SEPARATOR.into());

    let due = if status == "paid" { 0.0 } else { total };
    lines.push(format!("Cobrar do cliente: R$ {}", format_money(due)));
    lines.push(SEPARATOR.into());

    normalize_ascii(&(lines.join("\n") + "\n"))
}
