use crate::entities::{
    product::{self, ProductKind},
    product_history::{self, ChangeType},
};
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::{
    diff::{self, FieldChange, ProductSnapshot},
    products::{loss_warning, CreateProductInput, UpdateProductInput},
};
use crate::{errors::ApiError, ApiResponse, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn normalize_string(value: String) -> String {
    value.trim().to_string()
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .and_then(|v| if v.is_empty() { None } else { Some(v) })
}

fn ensure_decimal_non_negative(value: &Decimal, field: &str) -> Result<(), ApiError> {
    if *value < Decimal::ZERO {
        Err(ApiError::ValidationError(format!(
            "{field} cannot be negative"
        )))
    } else {
        Ok(())
    }
}

/// Creates the router for product and history endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", put(update_product).delete(delete_product))
        .route("/:id/history", get(get_product_history))
        .route("/history/:history_id/note", put(update_history_note))
}

/// List all products, newest first
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products retrieved", body = crate::ApiResponse<Vec<ProductResponse>>),
        (status = 500, description = "Store failure", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list_products()
        .await
        .map_err(map_service_error)?;

    let count = products.len();
    let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

    Ok(success_response(
        ApiResponse::success(data).with_count(count),
    ))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload or quantity invariant violated", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let CreateProductRequest {
        name,
        kind,
        import_price,
        sell_price,
        import_quantity,
        sold_quantity,
    } = payload;

    let name = normalize_string(name);
    if name.is_empty() {
        return Err(ApiError::ValidationError(
            "Product name cannot be blank".to_string(),
        ));
    }

    ensure_decimal_non_negative(&import_price, "importPrice")?;
    ensure_decimal_non_negative(&sell_price, "sellPrice")?;

    let input = CreateProductInput {
        name,
        kind: kind.unwrap_or_default(),
        import_price,
        sell_price,
        import_quantity,
        sold_quantity: sold_quantity.unwrap_or(0),
    };

    let product = state
        .services
        .products
        .create_product(input)
        .await
        .map_err(map_service_error)?;

    let warning = loss_warning(&product);

    Ok(created_response(
        ApiResponse::success(ProductResponse::from(product)).with_warning(warning),
    ))
}

/// Update a product, replacing all mutable fields
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid payload or quantity invariant violated", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let UpdateProductRequest {
        name,
        kind,
        import_price,
        sell_price,
        import_quantity,
        sold_quantity,
        note,
    } = payload;

    let name = normalize_string(name);
    if name.is_empty() {
        return Err(ApiError::ValidationError(
            "Product name cannot be blank".to_string(),
        ));
    }

    ensure_decimal_non_negative(&import_price, "importPrice")?;
    ensure_decimal_non_negative(&sell_price, "sellPrice")?;

    let input = UpdateProductInput {
        name,
        kind,
        import_price,
        sell_price,
        import_quantity,
        sold_quantity,
    };
    let note = normalize_optional_string(note);

    let product = state
        .services
        .products
        .update_product(id, input, note)
        .await
        .map_err(map_service_error)?;

    let warning = loss_warning(&product);

    Ok(success_response(
        ApiResponse::success(ProductResponse::from(product)).with_warning(warning),
    ))
}

/// Delete a product. Its history remains retrievable afterwards.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(
        ApiResponse::success(json!({})).with_message("Product deleted"),
    ))
}

/// Get the audit trail of a product, newest first
#[utoipa::path(
    get,
    path = "/api/products/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "History retrieved", body = crate::ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Store failure", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "History"
)]
pub async fn get_product_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let entries = state
        .services
        .history
        .get_history(id)
        .await
        .map_err(map_service_error)?;

    let count = entries.len();
    let data: Vec<HistoryEntryResponse> = entries
        .into_iter()
        .map(HistoryEntryResponse::from)
        .collect();

    Ok(success_response(
        ApiResponse::success(data).with_count(count),
    ))
}

/// Edit the free-text note on a history entry
#[utoipa::path(
    put,
    path = "/api/products/history/{history_id}/note",
    params(
        ("history_id" = Uuid, Path, description = "History entry ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = crate::ApiResponse<HistoryEntryResponse>),
        (status = 404, description = "History entry not found", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "History"
)]
pub async fn update_history_note(
    State(state): State<AppState>,
    Path(history_id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let note = normalize_optional_string(Some(payload.note));

    let entry = state
        .services
        .history
        .update_note(history_id, note)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ApiResponse::success(
        HistoryEntryResponse::from(entry),
    )))
}

// Request/Response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Widget",
    "type": "product",
    "importPrice": 100,
    "sellPrice": 120,
    "importQuantity": 10,
    "soldQuantity": 0
}))]
pub struct CreateProductRequest {
    /// Product display name
    #[validate(length(min = 1))]
    pub name: String,
    /// `product` (default) or `material`
    #[serde(default, rename = "type")]
    pub kind: Option<ProductKind>,
    /// Purchase price per unit
    pub import_price: Decimal,
    /// Sale price per unit
    pub sell_price: Decimal,
    /// Units purchased
    #[validate(range(min = 0))]
    pub import_quantity: i32,
    /// Units sold, defaults to 0
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sold_quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    pub import_price: Decimal,
    pub sell_price: Decimal,
    #[validate(range(min = 0))]
    pub import_quantity: i32,
    #[validate(range(min = 0))]
    pub sold_quantity: i32,
    /// Optional note attached to the resulting history entry
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New note text; blank clears the note
    pub note: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    pub import_price: Decimal,
    pub sell_price: Decimal,
    pub import_quantity: i32,
    pub sold_quantity: i32,
    /// sell price x sold quantity
    pub revenue: Decimal,
    /// import price x sold quantity
    pub cost: Decimal,
    pub profit: Decimal,
    pub is_loss: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            revenue: model.revenue(),
            cost: model.cost(),
            profit: model.profit(),
            is_loss: model.is_loss(),
            id: model.id,
            name: model.name,
            kind: model.kind,
            import_price: model.import_price,
            sell_price: model.sell_price,
            import_quantity: model.import_quantity,
            sold_quantity: model.sold_quantity,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<ProductSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_values: Option<ProductSnapshot>,
    /// Field-level diff, present on `update` entries only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<FieldChange>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<product_history::Model> for HistoryEntryResponse {
    fn from(model: product_history::Model) -> Self {
        let previous_values: Option<ProductSnapshot> = model
            .previous_values
            .as_ref()
            .and_then(|json| serde_json::from_value(json.clone()).ok());
        let new_values: Option<ProductSnapshot> = model
            .new_values
            .as_ref()
            .and_then(|json| serde_json::from_value(json.clone()).ok());

        let changes = match (model.change_type, previous_values.as_ref(), new_values.as_ref()) {
            (ChangeType::Update, Some(previous), Some(new)) => diff::changed_fields(previous, new),
            _ => Vec::new(),
        };

        Self {
            id: model.id,
            product_id: model.product_id,
            change_type: model.change_type,
            previous_values,
            new_values,
            changes,
            note: model.note,
            created_at: model.created_at,
        }
    }
}
