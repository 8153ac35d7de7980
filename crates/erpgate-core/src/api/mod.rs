//! REST client module for the Service Layer.
//!
//! This module provides the `SessionClient` for communicating with the
//! Service Layer, and the `ServiceLayer` trait the gateway depends on.
//!
//! The Service Layer authenticates with a session id obtained from
//! `POST Login` and sent back in the `B1SESSION` header.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub mod client;
pub mod error;
pub mod response;

pub use client::{SessionClient, SessionClientBuilder, SESSION_HEADER};
pub use error::{ClientError, RemoteErrorDetail, TransportFailure};
pub use response::ApiResponse;

/// The two calls the gateway makes against the Service Layer.
#[async_trait]
pub trait ServiceLayer: Send + Sync {
    async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse, ClientError>;

    async fn post(
        &self,
        path: &str,
        payload: Value,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ClientError>;
}

#[async_trait]
impl ServiceLayer for SessionClient {
    async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<ApiResponse, ClientError> {
        SessionClient::get(self, path, cancel).await
    }

    async fn post(
        &self,
        path: &str,
        payload: Value,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ClientError> {
        SessionClient::post(self, path, &payload, cancel).await
    }
}
