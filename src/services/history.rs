use crate::{
    entities::{
        product_history::{self, ChangeType},
        ProductHistory,
    },
    errors::ServiceError,
    services::diff::ProductSnapshot,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Appends immutable audit entries for product mutations.
#[derive(Clone)]
pub struct HistoryRecorder {
    db: Arc<DatabaseConnection>,
}

impl HistoryRecorder {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Appends one history entry for the given product change.
    pub async fn record(
        &self,
        product_id: Uuid,
        change_type: ChangeType,
        previous: Option<&ProductSnapshot>,
        new: Option<&ProductSnapshot>,
        note: Option<String>,
    ) -> Result<product_history::Model, ServiceError> {
        let previous_values = previous
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
        let new_values = new
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let entry = product_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            change_type: Set(change_type),
            previous_values: Set(previous_values),
            new_values: Set(new_values),
            note: Set(note),
            created_at: Set(Utc::now()),
        };

        Ok(entry.insert(&*self.db).await?)
    }

    /// Best-effort variant used around product mutations: the audit trail is
    /// auxiliary data and a failed append must not turn a committed product
    /// write into an error. Failures are logged and dropped.
    pub async fn record_or_log(
        &self,
        product_id: Uuid,
        change_type: ChangeType,
        previous: Option<&ProductSnapshot>,
        new: Option<&ProductSnapshot>,
        note: Option<String>,
    ) {
        if let Err(err) = self
            .record(product_id, change_type, previous, new, note)
            .await
        {
            warn!(
                %product_id,
                change_type = %change_type,
                error = %err,
                "failed to append product history entry"
            );
        }
    }
}

/// Read and note-edit access to the audit trail.
#[derive(Clone)]
pub struct HistoryService {
    db: Arc<DatabaseConnection>,
}

impl HistoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All history entries for a product, newest first. Returns entries even
    /// when the product itself no longer exists.
    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_history::Model>, ServiceError> {
        ProductHistory::find()
            .filter(product_history::Column::ProductId.eq(product_id))
            .order_by_desc(product_history::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Replaces the note on an existing entry. No other field is mutable
    /// through this path.
    #[instrument(skip(self))]
    pub async fn update_note(
        &self,
        history_id: Uuid,
        note: Option<String>,
    ) -> Result<product_history::Model, ServiceError> {
        let entry = ProductHistory::find_by_id(history_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("History entry {} not found", history_id))
            })?;

        let mut active: product_history::ActiveModel = entry.into();
        active.note = Set(note);

        Ok(active.update(&*self.db).await?)
    }
}
