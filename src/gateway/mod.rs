//! Payment gateway boundary.
//!
//! The gateway owns the hosted checkout flow and the authoritative
//! charge amount (it prices lines from its own price references). This
//! module defines the trait seam the services talk to, the metadata
//! snapshot that travels with a session, and the shape of the signed
//! events the gateway delivers back.

pub mod signature;
pub mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::ServiceError;

/// Event type that triggers order materialization. Everything else is
/// acknowledged and ignored.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

pub const METADATA_UID_KEY: &str = "uid";
pub const METADATA_ITEMS_KEY: &str = "items";

/// One cart line as snapshotted into the session metadata at creation
/// time. This snapshot is the only channel through which the reconciler
/// learns which release/sku/qty to materialize; the gateway session
/// itself does not preserve catalog identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemSnapshot {
    #[serde(rename = "releaseId")]
    pub release_id: String,
    pub sku: String,
    pub qty: i32,
    #[serde(rename = "unitPrice")]
    pub unit_price: Decimal,
    pub title: String,
}

impl CartItemSnapshot {
    pub fn encode_items(items: &[CartItemSnapshot]) -> Result<String, ServiceError> {
        Ok(serde_json::to_string(items)?)
    }

    pub fn decode_items(raw: &str) -> Result<Vec<CartItemSnapshot>, ServiceError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One gateway line item: an opaque price reference plus a quantity.
/// The gateway, not this system, resolves the reference to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayLineItem {
    pub price_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub line_items: Vec<GatewayLineItem>,
    /// Lower-cased ISO currency code
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub buyer_uid: String,
    pub items_snapshot: Vec<CartItemSnapshot>,
}

/// The gateway's handle on a created session: opaque id plus the hosted
/// redirect URL the buyer is sent to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<GatewaySession, ServiceError>;
}

// ---- Inbound webhook event shapes ----

/// A signed asynchronous payment event, delivered at-least-once.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PaymentEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEventData {
    pub object: CheckoutSessionObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    /// Opaque session id, the idempotency key for reconciliation
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CheckoutSessionObject {
    pub fn metadata_uid(&self) -> Option<&str> {
        self.metadata.get(METADATA_UID_KEY).map(String::as_str)
    }

    pub fn metadata_items_raw(&self) -> Option<&str> {
        self.metadata.get(METADATA_ITEMS_KEY).map(String::as_str)
    }
}
