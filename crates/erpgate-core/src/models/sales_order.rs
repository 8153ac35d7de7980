//! Sales order request, payload and response types.

use serde::{Deserialize, Serialize};

/// Incoming request to create a sales order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSalesOrderRequest {
    #[serde(default)]
    pub card_code: String,
    #[serde(default)]
    pub lines: Vec<SalesOrderLine>,
}

/// One order line.
///
/// Quantities and prices are `f64`, the Service Layer's own JSON number
/// representation. Values beyond double precision are rounded on the way in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrderLine {
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
}

/// Body of `POST Orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrderPayload {
    pub card_code: String,
    pub doc_date: String,
    pub doc_due_date: String,
    pub document_lines: Vec<DocumentLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentLine {
    pub item_code: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub warehouse_code: String,
}

/// Identifiers the Service Layer assigned to the new order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSalesOrderResponse {
    pub doc_entry: i64,
    pub doc_num: i64,
}
