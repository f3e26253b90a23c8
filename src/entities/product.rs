use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product kind: a sale item or a raw material
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "material")]
    Material,
}

/// Tracked inventory item
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    pub name: String,

    /// Sale item or raw material
    pub kind: ProductKind,

    /// Purchase price per unit
    pub import_price: Decimal,

    /// Sale price per unit
    pub sell_price: Decimal,

    /// Units purchased
    pub import_quantity: i32,

    /// Units sold; never exceeds `import_quantity`
    pub sold_quantity: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Revenue earned from sold units
    pub fn revenue(&self) -> Decimal {
        self.sell_price * Decimal::from(self.sold_quantity)
    }

    /// Acquisition cost of sold units
    pub fn cost(&self) -> Decimal {
        self.import_price * Decimal::from(self.sold_quantity)
    }

    pub fn profit(&self) -> Decimal {
        self.revenue() - self.cost()
    }

    /// True when every sale loses money
    pub fn is_loss(&self) -> bool {
        self.sell_price < self.import_price
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if let ActiveValue::NotSet = self.id {
                self.id = ActiveValue::Set(Uuid::new_v4());
            }

            if let ActiveValue::NotSet = self.created_at {
                self.created_at = ActiveValue::Set(Utc::now());
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn widget(import_price: Decimal, sell_price: Decimal, sold: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            kind: ProductKind::Product,
            import_price,
            sell_price,
            import_quantity: 100,
            sold_quantity: sold,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn derived_fields_follow_the_arithmetic() {
        let product = widget(dec!(10), dec!(20), 4);
        assert_eq!(product.revenue(), dec!(80));
        assert_eq!(product.cost(), dec!(40));
        assert_eq!(product.profit(), dec!(40));
        assert!(!product.is_loss());
    }

    #[test]
    fn loss_flag_ignores_quantities() {
        let product = widget(dec!(100), dec!(80), 0);
        assert!(product.is_loss());
        assert_eq!(product.revenue(), dec!(0));
        assert_eq!(product.profit(), dec!(0));
    }
}
