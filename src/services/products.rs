use crate::{
    entities::{
        product::{self, ProductKind},
        product_history::ChangeType,
        Product,
    },
    errors::ServiceError,
    services::{diff::ProductSnapshot, history::HistoryRecorder},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Advisory warning returned alongside products configured to sell at a loss
pub const LOSS_WARNING: &str = "sell price is below import price; this product will sell at a loss";

/// Fields accepted when creating a product
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub kind: ProductKind,
    pub import_price: Decimal,
    pub sell_price: Decimal,
    pub import_quantity: i32,
    pub sold_quantity: i32,
}

/// Fields accepted when updating a product. Updates replace the full field
/// set; there is no partial merge at this level.
#[derive(Debug, Clone)]
pub struct UpdateProductInput {
    pub name: String,
    pub kind: ProductKind,
    pub import_price: Decimal,
    pub sell_price: Decimal,
    pub import_quantity: i32,
    pub sold_quantity: i32,
}

/// Product CRUD with invariant enforcement and audit recording around every
/// mutation.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    recorder: HistoryRecorder,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, recorder: HistoryRecorder) -> Self {
        Self { db, recorder }
    }

    /// All products, newest-created first.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Creates a product and records a `create` history entry.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        ensure_quantity_invariant(input.sold_quantity, input.import_quantity)?;

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            kind: Set(input.kind),
            import_price: Set(input.import_price),
            sell_price: Set(input.sell_price),
            import_quantity: Set(input.import_quantity),
            sold_quantity: Set(input.sold_quantity),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let product = product.insert(&*self.db).await?;

        let snapshot = ProductSnapshot::from(&product);
        self.recorder
            .record_or_log(product_id, ChangeType::Create, None, Some(&snapshot), None)
            .await;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Replaces all mutable fields of an existing product and records an
    /// `update` history entry carrying both snapshots and the optional note.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
        note: Option<String>,
    ) -> Result<product::Model, ServiceError> {
        ensure_quantity_invariant(input.sold_quantity, input.import_quantity)?;

        let existing = self.get_product(product_id).await?;
        let previous = ProductSnapshot::from(&existing);

        let mut active: product::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.kind = Set(input.kind);
        active.import_price = Set(input.import_price);
        active.sell_price = Set(input.sell_price);
        active.import_quantity = Set(input.import_quantity);
        active.sold_quantity = Set(input.sold_quantity);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        let current = ProductSnapshot::from(&updated);
        self.recorder
            .record_or_log(
                product_id,
                ChangeType::Update,
                Some(&previous),
                Some(&current),
                note,
            )
            .await;

        info!("Updated product: {}", product_id);
        Ok(updated)
    }

    /// Deletes a product, recording a `delete` history entry first so the
    /// final field set is captured before the row disappears.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_product(product_id).await?;
        let snapshot = ProductSnapshot::from(&existing);

        self.recorder
            .record_or_log(product_id, ChangeType::Delete, Some(&snapshot), None, None)
            .await;

        Product::delete_by_id(product_id).exec(&*self.db).await?;

        info!("Deleted product: {}", product_id);
        Ok(())
    }
}

/// Sold units can never exceed imported units; violations are rejected, not
/// clamped.
fn ensure_quantity_invariant(sold_quantity: i32, import_quantity: i32) -> Result<(), ServiceError> {
    if sold_quantity > import_quantity {
        return Err(ServiceError::ValidationError(
            "sold quantity cannot exceed import quantity".to_string(),
        ));
    }
    Ok(())
}

/// Advisory loss warning. Materials are inputs rather than sale items, so
/// the warning only applies to the `product` kind; `is_loss` itself is still
/// reported for both.
pub fn loss_warning(product: &product::Model) -> Option<String> {
    (product.kind == ProductKind::Product && product.sell_price < product.import_price)
        .then(|| LOSS_WARNING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn model(kind: ProductKind, import_price: Decimal, sell_price: Decimal) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: "Steel rod".to_string(),
            kind,
            import_price,
            sell_price,
            import_quantity: 5,
            sold_quantity: 1,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn quantity_invariant_rejects_overselling() {
        assert!(ensure_quantity_invariant(10, 5).is_err());
        assert!(ensure_quantity_invariant(5, 5).is_ok());
        assert!(ensure_quantity_invariant(0, 0).is_ok());
    }

    #[test]
    fn warning_fires_for_loss_making_products() {
        let warning = loss_warning(&model(ProductKind::Product, dec!(100), dec!(80)));
        assert_eq!(warning.as_deref(), Some(LOSS_WARNING));
    }

    #[test]
    fn warning_is_suppressed_for_materials() {
        assert!(loss_warning(&model(ProductKind::Material, dec!(100), dec!(80))).is_none());
    }

    #[test]
    fn warning_is_absent_when_profitable_or_break_even() {
        assert!(loss_warning(&model(ProductKind::Product, dec!(80), dec!(100))).is_none());
        assert!(loss_warning(&model(ProductKind::Product, dec!(80), dec!(80))).is_none());
    }
}
