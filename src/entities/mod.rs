pub mod product;
pub mod product_history;

pub use product::Entity as Product;
pub use product_history::Entity as ProductHistory;
