//! Data models for the objects the gateway creates.
//!
//! Each module holds the incoming request DTO, the body sent to the
//! Service Layer, and the response returned to the gateway's caller:
//!
//! - `business_partner`: customers, suppliers and leads
//! - `item`: item master data
//! - `sales_order`: sales orders and their document lines
//!
//! Property names follow the Service Layer's PascalCase convention.

pub mod business_partner;
pub mod item;
pub mod sales_order;

pub use business_partner::{
    BpAddress, BusinessPartnerPayload, CreateBusinessPartnerRequest, CreateBusinessPartnerResponse,
};
pub use item::{CreateItemRequest, CreateItemResponse, ItemPayload};
pub use sales_order::{
    CreateSalesOrderRequest, CreateSalesOrderResponse, DocumentLine, SalesOrderLine, SalesOrderPayload,
};
