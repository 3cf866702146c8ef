//! Stripe Checkout client.
//!
//! Sessions are created through the form-encoded REST API. One client is
//! constructed at process start and injected wherever a
//! [`PaymentGateway`] is needed, so tests can substitute a fake.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, instrument};

use super::{CartItemSnapshot, CreateSessionRequest, GatewaySession, PaymentGateway};
use crate::errors::ServiceError;

pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(api_base: String, secret_key: String) -> Self {
        Self {
            http: Client::new(),
            api_base,
            secret_key,
        }
    }

    fn session_params(request: &CreateSessionRequest) -> Result<Vec<(String, String)>, ServiceError> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("currency".into(), request.currency.clone()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("metadata[uid]".into(), request.buyer_uid.clone()),
            (
                "metadata[items]".into(),
                CartItemSnapshot::encode_items(&request.items_snapshot)?,
            ),
        ];
        for (i, line) in request.line_items.iter().enumerate() {
            params.push((format!("line_items[{i}][price]"), line.price_id.clone()));
            params.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
        }
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(lines = request.line_items.len()))]
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<GatewaySession, ServiceError> {
        let params = Self::session_params(request)?;

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "gateway request failed");
                ServiceError::GatewayError(format!("session creation request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<StripeErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.error.message.or(e.error.error_type))
                .unwrap_or_else(|| format!("HTTP {status}"));
            error!(%status, detail, "gateway rejected session creation");
            return Err(ServiceError::GatewayError(detail));
        }

        let session: StripeSessionResponse = response.json().await.map_err(|e| {
            ServiceError::GatewayError(format!("malformed session response: {e}"))
        })?;

        Ok(GatewaySession {
            id: session.id,
            url: session.url,
        })
    }
}
