pub mod common;
pub mod products;

use crate::db::DbPool;
use crate::services::{
    history::{HistoryRecorder, HistoryService},
    products::ProductService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub history: Arc<HistoryService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        let recorder = HistoryRecorder::new(db_pool.clone());

        Self {
            products: Arc::new(ProductService::new(db_pool.clone(), recorder)),
            history: Arc::new(HistoryService::new(db_pool)),
        }
    }
}
