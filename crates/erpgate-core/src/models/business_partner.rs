//! Business partner request, payload and response types.

use serde::{Deserialize, Serialize};

/// Card types the Service Layer accepts for a business partner.
pub const CARD_TYPES: [&str; 3] = ["cCustomer", "cSupplier", "cLid"];

pub const DEFAULT_CARD_TYPE: &str = "cCustomer";

/// Incoming request to create a business partner.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBusinessPartnerRequest {
    #[serde(default)]
    pub card_code: String,
    #[serde(default)]
    pub card_name: String,
    pub card_type: Option<String>,
    #[serde(rename = "FederalTaxID")]
    pub federal_tax_id: Option<String>,
    pub billto_default: Option<String>,
    pub ship_to_default: Option<String>,
    #[serde(rename = "BPAddresses", default)]
    pub bp_addresses: Vec<BpAddress>,
}

/// One address of a business partner, in Service Layer shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BpAddress {
    #[serde(default)]
    pub address_name: String,
    #[serde(default = "default_address_type")]
    pub address_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_address_type() -> String {
    "bo_BillTo".to_string()
}

fn default_country() -> String {
    "GB".to_string()
}

/// Body of `POST BusinessPartners`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusinessPartnerPayload {
    pub card_code: String,
    pub card_name: String,
    pub card_type: String,
    #[serde(rename = "FederalTaxID", skip_serializing_if = "Option::is_none")]
    pub federal_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billto_default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to_default: Option<String>,
    #[serde(rename = "BPAddresses", skip_serializing_if = "Vec::is_empty")]
    pub bp_addresses: Vec<BpAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBusinessPartnerResponse {
    pub card_code: String,
    pub card_name: String,
}
