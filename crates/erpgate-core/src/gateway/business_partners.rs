use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api::{ClientError, ServiceLayer};
use crate::models::business_partner::{CARD_TYPES, DEFAULT_CARD_TYPE};
use crate::models::{BusinessPartnerPayload, CreateBusinessPartnerRequest, CreateBusinessPartnerResponse};

use super::{entity_exists, is_blank, GatewayError};

const ENTITY_SET: &str = "BusinessPartners";

/// Validate `req`, refuse duplicates, and create the business partner.
pub async fn create_business_partner(
    sl: &dyn ServiceLayer,
    req: CreateBusinessPartnerRequest,
    cancel: &CancellationToken,
) -> Result<CreateBusinessPartnerResponse, GatewayError> {
    info!(card_code = %req.card_code, card_type = ?req.card_type, "CreateBusinessPartner request");

    let payload = validate(req)?;

    if entity_exists(sl, ENTITY_SET, &payload.card_code, cancel).await? {
        return Err(GatewayError::Conflict(format!(
            "Business Partner with CardCode '{}' already exists.",
            payload.card_code
        )));
    }

    let response = CreateBusinessPartnerResponse {
        card_code: payload.card_code.clone(),
        card_name: payload.card_name.clone(),
    };
    let body = serde_json::to_value(&payload).map_err(ClientError::from)?;
    sl.post(ENTITY_SET, body, cancel).await?;

    info!(card_code = %response.card_code, "Business partner created");
    Ok(response)
}

fn validate(req: CreateBusinessPartnerRequest) -> Result<BusinessPartnerPayload, GatewayError> {
    if is_blank(&req.card_code) {
        return Err(GatewayError::Validation("CardCode is required.".to_string()));
    }
    if is_blank(&req.card_name) {
        return Err(GatewayError::Validation("CardName is required.".to_string()));
    }

    let card_type = req.card_type.unwrap_or_else(|| DEFAULT_CARD_TYPE.to_string());
    if !CARD_TYPES.contains(&card_type.as_str()) {
        return Err(GatewayError::Validation(format!(
            "CardType must be one of: {}.",
            CARD_TYPES.join(", ")
        )));
    }

    Ok(BusinessPartnerPayload {
        card_code: req.card_code,
        card_name: req.card_name,
        card_type,
        federal_tax_id: req.federal_tax_id,
        billto_default: req.billto_default,
        ship_to_default: req.ship_to_default,
        bp_addresses: req.bp_addresses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{Call, FakeServiceLayer};
    use serde_json::json;

    fn request(code: &str, name: &str) -> CreateBusinessPartnerRequest {
        CreateBusinessPartnerRequest {
            card_code: code.to_string(),
            card_name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_creates_with_default_card_type() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();

        let res = create_business_partner(&sl, request("C001", "Acme Ltd"), &cancel)
            .await
            .unwrap();
        assert_eq!(res.card_code, "C001");
        assert_eq!(res.card_name, "Acme Ltd");

        assert_eq!(
            sl.calls(),
            vec![
                Call::Get("BusinessPartners('C001')".to_string()),
                Call::Post(
                    "BusinessPartners".to_string(),
                    json!({"CardCode": "C001", "CardName": "Acme Ltd", "CardType": "cCustomer"})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_forwards_optional_fields_and_addresses() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();
        let req: CreateBusinessPartnerRequest = serde_json::from_value(json!({
            "CardCode": "S01",
            "CardName": "Supplies Co",
            "CardType": "cSupplier",
            "FederalTaxID": "GB123",
            "BPAddresses": [{"AddressName": "HQ", "City": "Leeds"}]
        }))
        .unwrap();

        create_business_partner(&sl, req, &cancel).await.unwrap();

        let posts = sl.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].1,
            json!({
                "CardCode": "S01",
                "CardName": "Supplies Co",
                "CardType": "cSupplier",
                "FederalTaxID": "GB123",
                "BPAddresses": [{
                    "AddressName": "HQ",
                    "AddressType": "bo_BillTo",
                    "City": "Leeds",
                    "Country": "GB"
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_rejects_missing_fields_and_bad_card_type() {
        let sl = FakeServiceLayer::default();
        let cancel = CancellationToken::new();

        let err = create_business_partner(&sl, request(" ", "Acme"), &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref m) if m.contains("CardCode")));

        let err = create_business_partner(&sl, request("C1", ""), &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref m) if m.contains("CardName")));

        let mut bad_type = request("C1", "Acme");
        bad_type.card_type = Some("cPartner".to_string());
        let err = create_business_partner(&sl, bad_type, &cancel).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref m) if m.contains("CardType")));

        // Nothing reached the Service Layer
        assert!(sl.calls().is_empty());
    }

    #[tokio::test]
    async fn test_conflict_when_partner_exists() {
        let sl = FakeServiceLayer::with_existing(&["BusinessPartners('O''Brien')"]);
        let cancel = CancellationToken::new();

        let err = create_business_partner(&sl, request("O'Brien", "Pat O'Brien"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(ref m) if m.contains("O'Brien")));
        assert!(sl.posts().is_empty());
    }
}
