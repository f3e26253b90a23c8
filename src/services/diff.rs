//! Snapshot capture and field-level diffing for product history entries.
//!
//! The comparison enumerates the fixed field set with exact typed equality;
//! keys are never discovered dynamically from the serialized form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::product::{self, ProductKind};

/// The full set of mutable product fields at a point in time, as stored on
/// a history entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    pub import_price: Decimal,
    pub sell_price: Decimal,
    pub import_quantity: i32,
    pub sold_quantity: i32,
}

impl From<&product::Model> for ProductSnapshot {
    fn from(model: &product::Model) -> Self {
        Self {
            name: model.name.clone(),
            kind: model.kind,
            import_price: model.import_price,
            sell_price: model.sell_price,
            import_quantity: model.import_quantity,
            sold_quantity: model.sold_quantity,
        }
    }
}

/// One field that differs between two snapshots, rendered for display
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Wire name of the field, e.g. `sellPrice`
    pub field: &'static str,
    /// Display label, e.g. `Sell price`
    pub label: &'static str,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    fn new(
        field: &'static str,
        label: &'static str,
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            field,
            label,
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Computes the fields where the two snapshots differ, in declaration order.
pub fn changed_fields(previous: &ProductSnapshot, new: &ProductSnapshot) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if previous.name != new.name {
        changes.push(FieldChange::new(
            "name",
            "Name",
            previous.name.clone(),
            new.name.clone(),
        ));
    }
    if previous.kind != new.kind {
        changes.push(FieldChange::new(
            "type",
            "Kind",
            kind_label(previous.kind),
            kind_label(new.kind),
        ));
    }
    if previous.import_price != new.import_price {
        changes.push(FieldChange::new(
            "importPrice",
            "Import price",
            format_price(previous.import_price),
            format_price(new.import_price),
        ));
    }
    if previous.sell_price != new.sell_price {
        changes.push(FieldChange::new(
            "sellPrice",
            "Sell price",
            format_price(previous.sell_price),
            format_price(new.sell_price),
        ));
    }
    if previous.import_quantity != new.import_quantity {
        changes.push(FieldChange::new(
            "importQuantity",
            "Import quantity",
            previous.import_quantity.to_string(),
            new.import_quantity.to_string(),
        ));
    }
    if previous.sold_quantity != new.sold_quantity {
        changes.push(FieldChange::new(
            "soldQuantity",
            "Sold quantity",
            previous.sold_quantity.to_string(),
            new.sold_quantity.to_string(),
        ));
    }

    changes
}

/// Display label for a product kind
pub fn kind_label(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::Product => "Product",
        ProductKind::Material => "Material",
    }
}

/// Renders a price as a grouped currency string, e.g. `1,500` or `80.5`
pub fn format_price(value: Decimal) -> String {
    let rendered = value.round_dp(2).normalize().to_string();
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), Some(frac_part.to_string())),
        None => (rendered, None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("", int_part),
    };
    let grouped = group_thousands(&digits);

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> ProductSnapshot {
        ProductSnapshot {
            name: "Widget".to_string(),
            kind: ProductKind::Product,
            import_price: dec!(100),
            sell_price: dec!(80),
            import_quantity: 10,
            sold_quantity: 0,
        }
    }

    #[test]
    fn identical_snapshots_produce_no_changes() {
        let base = snapshot();
        assert!(changed_fields(&base, &base).is_empty());
    }

    #[test]
    fn single_field_change_is_isolated() {
        let previous = snapshot();
        let mut new = snapshot();
        new.sell_price = dec!(150);

        let changes = changed_fields(&previous, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "sellPrice");
        assert_eq!(changes[0].old, "80");
        assert_eq!(changes[0].new, "150");
    }

    #[test]
    fn kind_changes_use_display_labels() {
        let previous = snapshot();
        let mut new = snapshot();
        new.kind = ProductKind::Material;

        let changes = changed_fields(&previous, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "type");
        assert_eq!(changes[0].old, "Product");
        assert_eq!(changes[0].new, "Material");
    }

    #[test]
    fn equal_decimals_with_different_scale_do_not_diff() {
        let previous = snapshot();
        let mut new = snapshot();
        new.sell_price = dec!(80.00);

        assert!(changed_fields(&previous, &new).is_empty());
    }

    #[test]
    fn prices_are_grouped() {
        assert_eq!(format_price(dec!(1500)), "1,500");
        assert_eq!(format_price(dec!(1234567.5)), "1,234,567.5");
        assert_eq!(format_price(dec!(80.00)), "80");
        assert_eq!(format_price(dec!(-42000)), "-42,000");
        assert_eq!(format_price(dec!(999)), "999");
    }

    #[test]
    fn snapshot_round_trips_through_json_with_wire_names() {
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(value["type"], "product");
        assert!(value.get("importPrice").is_some());

        let back: ProductSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot());
    }
}
