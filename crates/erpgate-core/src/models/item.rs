//! Item master data request, payload and response types.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEMS_GROUP_CODE: i32 = 100;

/// Service Layer boolean enum value for "yes".
pub const T_YES: &str = "tYES";

/// Incoming request to create an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub item_code: String,
    #[serde(default)]
    pub item_name: String,
    pub items_group_code: Option<i32>,
    pub inventory_item: Option<String>,
}

/// Body of `POST Items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemPayload {
    pub item_code: String,
    pub item_name: String,
    pub items_group_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_item: Option<String>,
    pub sales_item: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemResponse {
    pub item_code: String,
    pub item_name: String,
}
