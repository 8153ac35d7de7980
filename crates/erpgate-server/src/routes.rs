//! HTTP routes and the mapping from gateway failures to responses.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use erpgate_core::gateway::{self, GatewayError, SalesOrderSettings};
use erpgate_core::models::{
    CreateBusinessPartnerRequest, CreateBusinessPartnerResponse, CreateItemRequest, CreateItemResponse,
    CreateSalesOrderRequest, CreateSalesOrderResponse,
};
use erpgate_core::{ClientError, ServiceLayer, TransportFailure};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    service_layer: Arc<dyn ServiceLayer>,
    sales_orders: Arc<SalesOrderSettings>,
    /// Cancelled on shutdown; every request works with a child token.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        service_layer: Arc<dyn ServiceLayer>,
        sales_orders: SalesOrderSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service_layer,
            sales_orders: Arc::new(sales_orders),
            shutdown,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/BusinessPartners", post(create_business_partner))
        .route("/api/Items", post(create_item))
        .route("/api/SalesOrders", post(create_sales_order))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn create_business_partner(
    State(state): State<AppState>,
    Json(req): Json<CreateBusinessPartnerRequest>,
) -> Result<Json<CreateBusinessPartnerResponse>, ApiFailure> {
    let cancel = state.shutdown.child_token();
    let res = gateway::create_business_partner(state.service_layer.as_ref(), req, &cancel).await?;
    Ok(Json(res))
}

async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<Json<CreateItemResponse>, ApiFailure> {
    let cancel = state.shutdown.child_token();
    let res = gateway::create_item(state.service_layer.as_ref(), req, &cancel).await?;
    Ok(Json(res))
}

async fn create_sales_order(
    State(state): State<AppState>,
    Json(req): Json<CreateSalesOrderRequest>,
) -> Result<Json<CreateSalesOrderResponse>, ApiFailure> {
    let cancel = state.shutdown.child_token();
    let res = gateway::create_sales_order(
        state.service_layer.as_ref(),
        &state.sales_orders,
        req,
        &cancel,
    )
    .await?;
    Ok(Json(res))
}

/// A gateway failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiFailure(GatewayError);

impl From<GatewayError> for ApiFailure {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        GatewayError::Conflict(_) => StatusCode::CONFLICT,
        GatewayError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Upstream(client) => match client {
            ClientError::LoginFailed { .. } | ClientError::RequestFailed { .. } => StatusCode::BAD_GATEWAY,
            ClientError::Transport(TransportFailure::TimedOut(_)) => StatusCode::GATEWAY_TIMEOUT,
            ClientError::Transport(TransportFailure::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            ClientError::Transport(TransportFailure::Network(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        let mut body = json!({"error": self.0.to_string()});
        if let GatewayError::Upstream(ref client) = self.0 {
            if let Some(upstream) = client.status() {
                body["upstreamStatus"] = json!(upstream.as_u16());
            }
            if let Some(remote) = client.remote() {
                if let Some(code) = remote.code {
                    body["remoteCode"] = json!(code);
                }
                if let Some(ref message) = remote.message {
                    body["remoteMessage"] = json!(message);
                }
            }
        }

        (status, Json(body)).into_response()
    }
}
