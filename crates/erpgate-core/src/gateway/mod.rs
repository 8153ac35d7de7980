//! Gateway operations: validate a creation request, check the Service Layer
//! for conflicts, then forward the create call.
//!
//! Operations take any `ServiceLayer`, so they run the same against the real
//! `SessionClient` and against in-memory fakes.

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::api::{ClientError, ServiceLayer};
use crate::utils::entity_path;

pub mod business_partners;
pub mod items;
pub mod sales_orders;

pub use business_partners::create_business_partner;
pub use items::create_item;
pub use sales_orders::{create_sales_order, SalesOrderSettings};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request itself is unacceptable.
    #[error("{0}")]
    Validation(String),

    /// The entity to create already exists.
    #[error("{0}")]
    Conflict(String),

    /// The gateway is missing configuration the operation needs.
    #[error("Gateway misconfigured: {0}")]
    Misconfigured(String),

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

/// Check whether `entity_set('key')` exists.
///
/// A 404 means "no"; every other failure is propagated.
pub async fn entity_exists(
    sl: &dyn ServiceLayer,
    entity_set: &str,
    key: &str,
    cancel: &CancellationToken,
) -> Result<bool, ClientError> {
    match sl.get(&entity_path(entity_set, key), cancel).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}


#[cfg(test)]
mod tests {
    use super::testing::FakeServiceLayer;
    use super::*;

    #[tokio::test]
    async fn test_entity_exists_maps_404_to_false() {
        let sl = FakeServiceLayer::with_existing(&["Items('A1')"]);
        let cancel = CancellationToken::new();
        assert!(entity_exists(&sl, "Items", "A1", &cancel).await.unwrap());
        assert!(!entity_exists(&sl, "Items", "B2", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_entity_exists_escapes_key() {
        let sl = FakeServiceLayer::with_existing(&["BusinessPartners('O''Brien')"]);
        let cancel = CancellationToken::new();
        assert!(entity_exists(&sl, "BusinessPartners", "O'Brien", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_entity_exists_propagates_other_failures() {
        let mut sl = FakeServiceLayer::default();
        sl.failing.insert("Items('A1')".to_string());
        let cancel = CancellationToken::new();
        let err = entity_exists(&sl, "Items", "A1", &cancel).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }
}
