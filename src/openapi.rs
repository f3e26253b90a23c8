use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{product::ProductKind, product_history::ChangeType};
use crate::handlers::products;
use crate::services::diff::{FieldChange, ProductSnapshot};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockbook API",
        description = r#"
Inventory and profit tracking API.

Products and materials carry import/sell prices and quantities; the API
derives revenue, cost, profit and a loss flag, and keeps an append-only audit
trail of every create/update/delete with before/after snapshots and an
editable free-text note.
"#
    ),
    paths(
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::get_product_history,
        products::update_history_note,
    ),
    components(schemas(
        products::CreateProductRequest,
        products::UpdateProductRequest,
        products::UpdateNoteRequest,
        products::ProductResponse,
        products::HistoryEntryResponse,
        ProductSnapshot,
        FieldChange,
        ProductKind,
        ChangeType,
    )),
    tags(
        (name = "Products", description = "Product CRUD with derived financial fields"),
        (name = "History", description = "Audit trail queries and note edits")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
