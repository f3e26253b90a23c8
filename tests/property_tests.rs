//! Property-based tests for the derived-field arithmetic and the snapshot
//! diff, verifying the invariants across a wide range of inputs.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use stockbook_api::entities::product::{self, ProductKind};
use stockbook_api::services::diff::{changed_fields, format_price, ProductSnapshot};
use uuid::Uuid;

// Strategies for generating test data

fn price_strategy() -> impl Strategy<Value = Decimal> {
    // Up to two decimal places, like real price inputs
    (0i64..1_000_000_00, 0u32..=2).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn quantity_strategy() -> impl Strategy<Value = i32> {
    0i32..1_000_000
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,19}"
}

fn kind_strategy() -> impl Strategy<Value = ProductKind> {
    prop_oneof![Just(ProductKind::Product), Just(ProductKind::Material)]
}

fn snapshot_strategy() -> impl Strategy<Value = ProductSnapshot> {
    (
        name_strategy(),
        kind_strategy(),
        price_strategy(),
        price_strategy(),
        quantity_strategy(),
        quantity_strategy(),
    )
        .prop_map(
            |(name, kind, import_price, sell_price, import_quantity, sold_quantity)| {
                ProductSnapshot {
                    name,
                    kind,
                    import_price,
                    sell_price,
                    import_quantity,
                    sold_quantity,
                }
            },
        )
}

fn model(import_price: Decimal, sell_price: Decimal, sold_quantity: i32) -> product::Model {
    product::Model {
        id: Uuid::new_v4(),
        name: "Widget".to_string(),
        kind: ProductKind::Product,
        import_price,
        sell_price,
        import_quantity: i32::MAX,
        sold_quantity,
        created_at: Utc::now(),
        updated_at: None,
    }
}

proptest! {
    #[test]
    fn derived_fields_hold_exactly(
        import_price in price_strategy(),
        sell_price in price_strategy(),
        sold in quantity_strategy(),
    ) {
        let product = model(import_price, sell_price, sold);

        prop_assert_eq!(product.revenue(), sell_price * Decimal::from(sold));
        prop_assert_eq!(product.cost(), import_price * Decimal::from(sold));
        prop_assert_eq!(product.profit(), product.revenue() - product.cost());
        prop_assert_eq!(product.is_loss(), sell_price < import_price);
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty(snapshot in snapshot_strategy()) {
        prop_assert!(changed_fields(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn single_price_edit_produces_a_single_change(
        snapshot in snapshot_strategy(),
        new_sell_price in price_strategy(),
    ) {
        prop_assume!(new_sell_price != snapshot.sell_price);

        let mut edited = snapshot.clone();
        edited.sell_price = new_sell_price;

        let changes = changed_fields(&snapshot, &edited);
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(changes[0].field, "sellPrice");
        prop_assert_eq!(&changes[0].old, &format_price(snapshot.sell_price));
        prop_assert_eq!(&changes[0].new, &format_price(new_sell_price));
    }

    #[test]
    fn diff_is_empty_iff_snapshots_are_equal(
        previous in snapshot_strategy(),
        new in snapshot_strategy(),
    ) {
        let changes = changed_fields(&previous, &new);
        prop_assert_eq!(changes.is_empty(), previous == new);
    }

    #[test]
    fn snapshots_round_trip_through_json(snapshot in snapshot_strategy()) {
        let value = serde_json::to_value(&snapshot).unwrap();
        let back: ProductSnapshot = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back, snapshot);
    }

    #[test]
    fn price_formatting_only_inserts_separators(price in price_strategy()) {
        let formatted = format_price(price);
        let stripped: String = formatted.chars().filter(|c| *c != ',').collect();
        prop_assert_eq!(stripped, price.round_dp(2).normalize().to_string());
    }
}
