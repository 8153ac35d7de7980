//! erpgate core: a session-managed Service Layer client and the gateway
//! operations built on it.
//!
//! - `api`: `SessionClient`, its error taxonomy and the `ServiceLayer` trait
//! - `auth`: credentials and the cached session
//! - `config`: file + environment configuration
//! - `gateway`: create business partners, items and sales orders
//! - `models`: request, payload and response types
//! - `utils`: OData path helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod models;
pub mod utils;

pub use api::{ApiResponse, ClientError, RemoteErrorDetail, ServiceLayer, SessionClient, TransportFailure};
pub use config::{Config, ServiceLayerConfig};
pub use gateway::GatewayError;
