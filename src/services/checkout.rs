use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::gateway::{
    CartItemSnapshot, CreateSessionRequest, GatewayLineItem, GatewaySession, PaymentGateway,
};

/// One cart line as submitted by the storefront.
///
/// `stripe_price_id` is what the gateway charges from; `unit_price` is
/// only snapshotted into the session metadata so the reconciler can
/// rebuild the order record without trusting anything client-side at
/// webhook time.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutItemInput {
    pub release_id: String,
    pub sku: String,
    pub qty: i32,
    pub stripe_price_id: String,
    pub unit_price: Decimal,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCheckoutSessionInput {
    pub items: Vec<CheckoutItemInput>,
    pub currency: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Creates hosted payment sessions (core part A of the checkout flow).
///
/// Deliberately stateless: no catalog-store writes happen here, so a
/// failed or abandoned attempt leaves nothing to clean up and the buyer
/// can always retry, minting a fresh session.
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    event_sender: EventSender,
    default_currency: String,
}

impl CheckoutService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        event_sender: EventSender,
        default_currency: String,
    ) -> Self {
        Self {
            gateway,
            event_sender,
            default_currency,
        }
    }

    #[instrument(skip(self, input), fields(uid = %user.uid))]
    pub async fn create_session(
        &self,
        user: &AuthenticatedUser,
        input: CreateCheckoutSessionInput,
    ) -> Result<GatewaySession, ServiceError> {
        validate_input(&input)?;

        let currency = input
            .currency
            .as_deref()
            .unwrap_or(&self.default_currency)
            .to_ascii_lowercase();

        let line_items = input
            .items
            .iter()
            .map(|item| GatewayLineItem {
                price_id: item.stripe_price_id.clone(),
                quantity: item.qty as u32,
            })
            .collect();

        let items_snapshot = input
            .items
            .iter()
            .map(|item| CartItemSnapshot {
                release_id: item.release_id.clone(),
                sku: item.sku.clone(),
                qty: item.qty,
                unit_price: item.unit_price,
                title: item.title.clone(),
            })
            .collect::<Vec<_>>();

        let request = CreateSessionRequest {
            line_items,
            currency,
            success_url: input.success_url,
            cancel_url: input.cancel_url,
            buyer_uid: user.uid.clone(),
            items_snapshot,
        };

        let session = self.gateway.create_checkout_session(&request).await?;

        info!(session_id = %session.id, "checkout session created");
        self.event_sender
            .send(Event::CheckoutSessionCreated {
                session_id: session.id.clone(),
                user_id: user.uid.clone(),
                line_count: request.line_items.len(),
            })
            .await;

        Ok(session)
    }
}

fn validate_input(input: &CreateCheckoutSessionInput) -> Result<(), ServiceError> {
    if input.items.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "checkout requires at least one item".to_string(),
        ));
    }
    for (i, item) in input.items.iter().enumerate() {
        if item.qty < 1 {
            return Err(ServiceError::InvalidArgument(format!(
                "items[{i}].qty must be a positive integer"
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(ServiceError::InvalidArgument(format!(
                "items[{i}].unit_price must not be negative"
            )));
        }
        if item.stripe_price_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(format!(
                "items[{i}].stripe_price_id is required"
            )));
        }
        if item.sku.trim().is_empty() || item.release_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(format!(
                "items[{i}] must carry release_id and sku"
            )));
        }
    }
    for (name, url) in [
        ("success_url", &input.success_url),
        ("cancel_url", &input.cancel_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ServiceError::InvalidArgument(format!(
                "{name} must be an absolute http(s) URL"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct RecordingGateway {
        requests: Mutex<Vec<CreateSessionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_checkout_session(
            &self,
            request: &CreateSessionRequest,
        ) -> Result<GatewaySession, ServiceError> {
            if self.fail {
                return Err(ServiceError::GatewayError("no such price".to_string()));
            }
            self.requests.lock().unwrap().push(request.clone());
            Ok(GatewaySession {
                id: "cs_test_1".to_string(),
                url: "https://checkout.example/cs_test_1".to_string(),
            })
        }
    }

    fn service(fail: bool) -> (CheckoutService, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway {
            requests: Mutex::new(vec![]),
            fail,
        });
        let (tx, _rx) = mpsc::channel(16);
        let svc = CheckoutService::new(
            gateway.clone(),
            EventSender::new(tx),
            "usd".to_string(),
        );
        (svc, gateway)
    }

    fn buyer() -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "u1".to_string(),
            email: "u1@example.com".to_string(),
            is_admin: false,
        }
    }

    fn valid_input() -> CreateCheckoutSessionInput {
        CreateCheckoutSessionInput {
            items: vec![CheckoutItemInput {
                release_id: "blasphemous-death-ritual".into(),
                sku: "BLSDTH-LP-BLK".into(),
                qty: 2,
                stripe_price_id: "price_lp".into(),
                unit_price: dec!(24.99),
                title: "Blasphemous Death Ritual".into(),
            }],
            currency: Some("USD".into()),
            success_url: "https://shop.example/thanks".into(),
            cancel_url: "https://shop.example/cart".into(),
        }
    }

    #[tokio::test]
    async fn creates_session_with_metadata_snapshot() {
        let (svc, gateway) = service(false);
        let session = svc.create_session(&buyer(), valid_input()).await.unwrap();
        assert_eq!(session.id, "cs_test_1");

        let requests = gateway.requests.lock().unwrap();
        let req = &requests[0];
        assert_eq!(req.currency, "usd", "currency is lower-cased");
        assert_eq!(req.buyer_uid, "u1");
        assert_eq!(req.line_items[0].price_id, "price_lp");
        assert_eq!(req.line_items[0].quantity, 2);
        assert_eq!(req.items_snapshot[0].sku, "BLSDTH-LP-BLK");
        assert_eq!(req.items_snapshot[0].unit_price, dec!(24.99));
    }

    #[tokio::test]
    async fn rejects_empty_cart() {
        let (svc, _) = service(false);
        let mut input = valid_input();
        input.items.clear();
        assert!(matches!(
            svc.create_session(&buyer(), input).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn rejects_non_positive_quantity() {
        let (svc, _) = service(false);
        let mut input = valid_input();
        input.items[0].qty = 0;
        assert!(matches!(
            svc.create_session(&buyer(), input).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn rejects_missing_price_reference() {
        let (svc, _) = service(false);
        let mut input = valid_input();
        input.items[0].stripe_price_id = "  ".into();
        assert!(matches!(
            svc.create_session(&buyer(), input).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn rejects_relative_redirect_urls() {
        let (svc, _) = service(false);
        let mut input = valid_input();
        input.success_url = "/thanks".into();
        assert!(matches!(
            svc.create_session(&buyer(), input).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_gateway_error() {
        let (svc, _) = service(true);
        assert!(matches!(
            svc.create_session(&buyer(), valid_input()).await,
            Err(ServiceError::GatewayError(_))
        ));
    }
}
