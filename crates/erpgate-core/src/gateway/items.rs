use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{ClientError, ServiceLayer};
use crate::models::item::{DEFAULT_ITEMS_GROUP_CODE, T_YES};
use crate::models::{CreateItemRequest, CreateItemResponse, ItemPayload};

use super::{entity_exists, is_blank, GatewayError};

const ENTITY_SET: &str = "Items";

/// Sanitize and validate `req`, refuse duplicates, and create the item.
pub async fn create_item(
    sl: &dyn ServiceLayer,
    req: CreateItemRequest,
    cancel: &CancellationToken,
) -> Result<CreateItemResponse, GatewayError> {
    info!(
        item_code = %req.item_code,
        item_name = %req.item_name,
        items_group_code = ?req.items_group_code,
        "CreateItem request"
    );

    let payload = validate(req)?;

    if entity_exists(sl, ENTITY_SET, &payload.item_code, cancel).await? {
        return Err(GatewayError::Conflict(format!(
            "Item with ItemCode '{}' already exists.",
            payload.item_code
        )));
    }

    let response = CreateItemResponse {
        item_code: payload.item_code.clone(),
        item_name: payload.item_name.clone(),
    };
    let body = serde_json::to_value(&payload).map_err(ClientError::from)?;
    sl.post(ENTITY_SET, body, cancel).await?;

    info!(item_code = %response.item_code, "Item created");
    Ok(response)
}

/// Item codes keep ASCII letters and digits only.
fn sanitize_code(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Item names additionally keep whitespace.
fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect()
}

fn validate(req: CreateItemRequest) -> Result<ItemPayload, GatewayError> {
    let item_code = sanitize_code(&req.item_code);
    if is_blank(&item_code) {
        return Err(GatewayError::Validation("ItemCode is required.".to_string()));
    }
    let item_name = sanitize_name(&req.item_name);
    if is_blank(&item_name) {
        return Err(GatewayError::Validation("ItemName is required.".to_string()));
    }

    Ok(ItemPayload {
        item_code,
        item_name,
        items_group_code: req.items_group_code.unwrap_or(DEFAULT_ITEMS_GROUP_CODE),
        inventory_item: Some(req.inventory_item.unwrap_or_else(|| T_YES.to_string())),
        sales_item: T_YES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{Call, FakeServiceLayer};
    use serde_json::json;

    fn request(code: &str, name: &str) -> CreateItemRequest {
        CreateItemRequest {
            item_code: code.to_string(),
            item_name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_code("A-001/x é"), "A001x");
        assert_eq!(sanitize_name("Blue Widget (XL)!"), "Blue Widget XL");
    }

    #[tokio::test]
    async fn test_creates_sanitized_item_with_defaults() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();

        let res = create_item(&sl, request("W-100", "Widget #1"), &cancel).await.unwrap();
        assert_eq!(res.item_code, "W100");
        assert_eq!(res.item_name, "Widget 1");

        assert_eq!(
            sl.calls(),
            vec![
                Call::Get("Items('W100')".to_string()),
                Call::Post(
                    "Items".to_string(),
                    json!({
                        "ItemCode": "W100",
                        "ItemName": "Widget 1",
                        "ItemsGroupCode": 100,
                        "InventoryItem": "tYES",
                        "SalesItem": "tYES"
                    })
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_keeps_explicit_group_and_inventory_flag() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();
        let mut req = request("SVC1", "Consulting hour");
        req.items_group_code = Some(105);
        req.inventory_item = Some("tNO".to_string());

        create_item(&sl, req, &cancel).await.unwrap();

        let posts = sl.posts();
        assert_eq!(posts[0].1["ItemsGroupCode"], json!(105));
        assert_eq!(posts[0].1["InventoryItem"], json!("tNO"));
    }

    #[tokio::test]
    async fn test_rejects_codes_that_sanitize_to_nothing() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();

        let err = create_item(&sl, request("--//", "Widget"), &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref m) if m.contains("ItemCode")));

        let err = create_item(&sl, request("W1", "!!!"), &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref m) if m.contains("ItemName")));
        assert!(sl.calls().is_empty());
    }

    #[tokio::test]
    async fn test_conflict_when_item_exists() {
        let sl = FakeServiceLayer::with_existing(&["Items('W100')"]);
        let cancel = CancellationToken::new();

        let err = create_item(&sl, request("W100", "Widget"), &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
        assert!(sl.posts().is_empty());
    }
}
