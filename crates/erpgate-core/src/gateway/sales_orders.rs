use chrono::{Local, NaiveDate};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{ClientError, ServiceLayer};
use crate::models::{
    CreateSalesOrderRequest, CreateSalesOrderResponse, DocumentLine, SalesOrderPayload,
};

use super::{entity_exists, is_blank, GatewayError};

const ENTITY_SET: &str = "Orders";

/// Gateway settings that sales orders depend on.
#[derive(Debug, Clone, Default)]
pub struct SalesOrderSettings {
    /// Warehouse applied to every document line.
    pub default_warehouse_code: Option<String>,
}

/// Validate `req`, make sure the customer and every item exist, and create
/// the order dated today.
pub async fn create_sales_order(
    sl: &dyn ServiceLayer,
    settings: &SalesOrderSettings,
    req: CreateSalesOrderRequest,
    cancel: &CancellationToken,
) -> Result<CreateSalesOrderResponse, GatewayError> {
    info!(card_code = %req.card_code, lines = req.lines.len(), "CreateSalesOrder request");

    validate(&req)?;

    if !entity_exists(sl, "BusinessPartners", &req.card_code, cancel).await? {
        return Err(GatewayError::Validation(format!(
            "CardCode '{}' does not exist in the Service Layer.",
            req.card_code
        )));
    }
    for line in &req.lines {
        if !entity_exists(sl, "Items", &line.item_code, cancel).await? {
            return Err(GatewayError::Validation(format!(
                "ItemCode '{}' does not exist in the Service Layer.",
                line.item_code
            )));
        }
    }

    let warehouse = settings
        .default_warehouse_code
        .as_deref()
        .filter(|w| !is_blank(w))
        .ok_or_else(|| {
            GatewayError::Misconfigured("service_layer.default_warehouse_code is not set".to_string())
        })?;

    let payload = build_payload(req, warehouse, Local::now().date_naive());
    let body = serde_json::to_value(&payload).map_err(ClientError::from)?;
    let created = sl.post(ENTITY_SET, body, cancel).await?;

    let response = CreateSalesOrderResponse {
        doc_entry: created.i64_field("DocEntry").unwrap_or(0),
        doc_num: created.i64_field("DocNum").unwrap_or(0),
    };
    info!(doc_entry = response.doc_entry, doc_num = response.doc_num, "Sales order created");
    Ok(response)
}

fn validate(req: &CreateSalesOrderRequest) -> Result<(), GatewayError> {
    if is_blank(&req.card_code) {
        return Err(GatewayError::Validation("CardCode is required.".to_string()));
    }
    if req.lines.is_empty() {
        return Err(GatewayError::Validation("At least one line (Lines) is required.".to_string()));
    }
    for line in &req.lines {
        if is_blank(&line.item_code) {
            return Err(GatewayError::Validation("Every line must have an ItemCode.".to_string()));
        }
        if line.quantity.is_nan() || line.quantity <= 0.0 {
            return Err(GatewayError::Validation("Every line must have Quantity > 0.".to_string()));
        }
    }
    Ok(())
}

fn build_payload(req: CreateSalesOrderRequest, warehouse: &str, date: NaiveDate) -> SalesOrderPayload {
    let date = date.format("%Y-%m-%d").to_string();
    SalesOrderPayload {
        card_code: req.card_code,
        doc_date: date.clone(),
        doc_due_date: date,
        document_lines: req
            .lines
            .into_iter()
            .map(|l| DocumentLine {
                item_code: l.item_code,
                quantity: l.quantity,
                unit_price: l.price,
                warehouse_code: warehouse.to_string(),
            })
            .collect(),
    }
}
