//! Order payload model
//!
//! Deserialization is deliberately permissive: the desktop shell and
//! the storefront emit slightly different field names and send money
//! and quantities as numbers or strings. Every field is optional; the
//! formatter decides what a missing field means.

use serde::Deserialize;

use super::money::parse_money;

/// Scalar that arrives as a number or a string (ids, house numbers, zips)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrText {
    Num(i64),
    Text(String),
}

impl std::fmt::Display for NumOrText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumOrText::Num(n) => write!(f, "{n}"),
            NumOrText::Text(s) => f.write_str(s),
        }
    }
}

/// Money value as the payload carries it (number or display string)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Num(f64),
    Text(String),
}

impl MoneyInput {
    /// Parsed amount; unparsable strings resolve to 0
    pub fn amount(&self) -> f64 {
        match self {
            MoneyInput::Num(n) => *n,
            MoneyInput::Text(s) => parse_money(s),
        }
    }

    /// Whether the payload value counts as "present" for fallbacks
    ///
    /// A literal 0 or an empty string does not override a computed
    /// value; the string "0" does.
    pub fn is_set(&self) -> bool {
        match self {
            MoneyInput::Num(n) => *n != 0.0,
            MoneyInput::Text(s) => !s.is_empty(),
        }
    }
}

/// Quantity as the payload carries it (number or string)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QtyInput {
    Num(i64),
    Text(String),
}

impl QtyInput {
    /// Parsed quantity; garbage and non-positive values resolve to None
    pub fn value(&self) -> Option<u32> {
        let n = match self {
            QtyInput::Num(n) => *n,
            QtyInput::Text(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits.parse().ok()?
            }
        };
        u32::try_from(n).ok().filter(|&q| q > 0)
    }
}

/// Extras attached to a line item
///
/// Three shapes survive in the wild: a legacy plain-text blob, a flat
/// array, and a grouped object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExtrasInput {
    Grouped(ExtraGroups),
    List(Vec<ExtraItem>),
    Legacy(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraGroups {
    pub groups: Vec<ExtraGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraGroup {
    pub group: Option<String>,
    pub items: Vec<ExtraItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtraItem {
    #[serde(alias = "product_name")]
    pub name: Option<String>,
    pub quantity: Option<QtyInput>,
    pub price: Option<MoneyInput>,
}

/// One ordered product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(alias = "name")]
    pub product_name: Option<String>,
    #[serde(alias = "price")]
    pub product_price: Option<MoneyInput>,
    #[serde(alias = "qty")]
    pub quantity: Option<QtyInput>,
    pub total: Option<MoneyInput>,
    #[serde(alias = "note")]
    pub product_note: Option<String>,
    #[serde(alias = "extras")]
    pub product_extras: Option<ExtrasInput>,
}

/// Full order payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: Option<NumOrText>,
    pub store_name: Option<String>,
    /// Order timestamp as "DD-MM-YYYY HH:MM"
    pub date: Option<String>,

    // Locator aliases; precedence is resolved in locator()
    pub localizador: Option<String>,
    pub localizador_pedido: Option<String>,
    pub tracking: Option<String>,
    pub hash: Option<String>,
    pub order_key: Option<String>,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub address_number: Option<NumOrText>,
    pub address_complement: Option<String>,
    pub neighborhood: Option<String>,
    pub reference: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<NumOrText>,

    pub items: Vec<LineItem>,

    #[serde(alias = "sub_total")]
    pub subtotal: Option<MoneyInput>,
    #[serde(alias = "shipping", alias = "shipping_total")]
    pub delivery_price: Option<MoneyInput>,
    pub coupon_name: Option<String>,
    #[serde(alias = "coupon_discount_value")]
    pub coupon_discount: Option<MoneyInput>,
    #[serde(alias = "order_total")]
    pub total: Option<MoneyInput>,

    #[serde(alias = "order_payment_status")]
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub payment_change: Option<MoneyInput>,
}

impl Order {
    /// First non-empty locator across the known aliases
    pub fn locator(&self) -> Option<&str> {
        [
            &self.localizador,
            &self.localizador_pedido,
            &self.tracking,
            &self.hash,
            &self.order_key,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .find(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_number_or_string() {
        let order: Order = serde_json::from_str(r#"{"subtotal": 10.5}"#).unwrap();
        assert_eq!(order.subtotal.unwrap().amount(), 10.5);

        let order: Order = serde_json::from_str(r#"{"subtotal": "R$ 10,50"}"#).unwrap();
        assert_eq!(order.subtotal.unwrap().amount(), 10.5);
    }

    #[test]
    fn test_field_aliases() {
        let order: Order =
            serde_json::from_str(r#"{"sub_total": 5, "shipping": 2, "order_total": 7}"#).unwrap();
        assert_eq!(order.subtotal.unwrap().amount(), 5.0);
        assert_eq!(order.delivery_price.unwrap().amount(), 2.0);
        assert_eq!(order.total.unwrap().amount(), 7.0);
    }

    #[test]
    fn test_locator_precedence() {
        let order: Order =
            serde_json::from_str(r#"{"tracking": "", "hash": "ABCD1234"}"#).unwrap();
        assert_eq!(order.locator(), Some("ABCD1234"));

        let order: Order =
            serde_json::from_str(r#"{"localizador": "XY12", "hash": "ABCD1234"}"#).unwrap();
        assert_eq!(order.locator(), Some("XY12"));
    }

    #[test]
    fn test_item_aliases_and_extras_shapes() {
        let item: LineItem =
            serde_json::from_str(r#"{"name": "Coxinha", "price": "5,50", "qty": "2"}"#).unwrap();
        assert_eq!(item.product_name.as_deref(), Some("Coxinha"));
        assert_eq!(item.quantity.unwrap().value(), Some(2));

        let item: LineItem =
            serde_json::from_str(r#"{"extras": [{"name": "Bacon", "price": 2}]}"#).unwrap();
        assert!(matches!(item.product_extras, Some(ExtrasInput::List(_))));

        let item: LineItem =
            serde_json::from_str(r#"{"extras": {"groups": [{"group": "Molhos", "items": []}]}}"#)
                .unwrap();
        assert!(matches!(item.product_extras, Some(ExtrasInput::Grouped(_))));

        let item: LineItem = serde_json::from_str(r#"{"extras": "Molhos:\nKetchup"}"#).unwrap();
        assert!(matches!(item.product_extras, Some(ExtrasInput::Legacy(_))));
    }

    #[test]
    fn test_qty_garbage() {
        let q: QtyInput = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(q.value(), None);
        let q: QtyInput = serde_json::from_str("0").unwrap();
        assert_eq!(q.value(), None);
        let q: QtyInput = serde_json::from_str(r#""3 un""#).unwrap();
        assert_eq!(q.value(), Some(3));
    }
}
