use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{cart, order, order_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::gateway::{CartItemSnapshot, PaymentEvent, CHECKOUT_COMPLETED};
use crate::services::inventory::InventoryService;

/// Namespace for deriving order ids from gateway session ids (UUIDv5).
/// Fixed forever: the same session must always map to the same order id.
const ORDER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f3d_a7c1_94e2_4b8a_9d05_c21e_7a40_51b6);

/// Deterministic order id for a checkout session. The idempotency key
/// of the whole reconciliation flow.
pub fn order_id_for_session(session_id: &str) -> Uuid {
    Uuid::new_v5(&ORDER_ID_NAMESPACE, session_id.as_bytes())
}

/// Outcome of processing one delivered payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Event type is not acted upon; acknowledged so the gateway stops
    /// retrying.
    Ignored,
    /// This session was already reconciled (gateway redelivery).
    AlreadyProcessed { order_id: Uuid },
    /// A new order was materialized.
    OrderCreated {
        order_id: Uuid,
        skipped_lines: Vec<String>,
    },
}

/// Turns completed-payment events into orders, exactly once per session
/// (core part B of the checkout flow).
///
/// The order insert is the claim step: its id is derived from the
/// session id and written create-if-absent inside the same transaction
/// as the order lines, so a redelivered event observes the conflict and
/// becomes a no-op before any stock or cart mutation.
pub struct ReconcilerService {
    db: Arc<DatabaseConnection>,
    inventory: Arc<InventoryService>,
    event_sender: EventSender,
}

impl ReconcilerService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        inventory: Arc<InventoryService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            inventory,
            event_sender,
        }
    }

    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn process_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<ReconcileOutcome, ServiceError> {
        if event.event_type != CHECKOUT_COMPLETED {
            info!("ignoring event type");
            return Ok(ReconcileOutcome::Ignored);
        }

        let session = &event.data.object;

        // Both correlation fields were attached by the session initiator;
        // their absence means the session was created outside the normal
        // path and must not silently produce a malformed order.
        let uid = session
            .metadata_uid()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ServiceError::InvalidArgument(
                    "event metadata is missing the buyer uid".to_string(),
                )
            })?
            .to_string();
        let items_raw = session.metadata_items_raw().ok_or_else(|| {
            ServiceError::InvalidArgument(
                "event metadata is missing the items snapshot".to_string(),
            )
        })?;

        let items = CartItemSnapshot::decode_items(items_raw).map_err(|_| {
            ServiceError::InvalidArgument("event metadata items snapshot is malformed".to_string())
        })?;
        if items.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "event metadata items snapshot is empty".to_string(),
            ));
        }
        for (i, item) in items.iter().enumerate() {
            if item.qty < 1 || item.unit_price < Decimal::ZERO {
                return Err(ServiceError::InvalidArgument(format!(
                    "metadata items[{i}] carries an invalid qty or unit price"
                )));
            }
        }

        // The event's own totals are never trusted; the authoritative
        // subtotal is recomputed from the snapshot.
        let subtotal: Decimal = items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.qty))
            .sum();

        let order_id = order_id_for_session(&session.id);
        let customer = session.customer_details.as_ref();

        let order_model = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(uid.clone()),
            status: Set(order::OrderStatus::Paid),
            currency: Set(session
                .currency
                .clone()
                .unwrap_or_else(|| "usd".to_string())),
            subtotal: Set(subtotal),
            shipping_total: Set(Decimal::ZERO),
            tax_total: Set(Decimal::ZERO),
            grand_total: Set(subtotal),
            customer_name: Set(customer.and_then(|c| c.name.clone())),
            customer_email: Set(customer.and_then(|c| c.email.clone())),
            payment_provider: Set("stripe".to_string()),
            payment_status: Set("paid".to_string()),
            payment_intent_id: Set(session.payment_intent.clone()),
            checkout_session_id: Set(session.id.clone()),
            created_at: Set(Utc::now()),
        };

        let txn = self.db.begin().await?;

        let inserted = order::Entity::insert(order_model)
            .on_conflict(
                OnConflict::column(order::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if inserted == 0 {
            txn.commit().await?;
            info!(%order_id, "duplicate delivery; order already materialized");
            return Ok(ReconcileOutcome::AlreadyProcessed { order_id });
        }

        let line_models: Vec<order_item::ActiveModel> = items
            .iter()
            .map(|item| order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                release_id: Set(item.release_id.clone()),
                sku: Set(item.sku.clone()),
                title: Set(item.title.clone()),
                quantity: Set(item.qty),
                unit_price: Set(item.unit_price),
                subtotal: Set(item.unit_price * Decimal::from(item.qty)),
            })
            .collect();
        order_item::Entity::insert_many(line_models)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        // Best-effort stock decrements, one atomic conditional statement
        // per line. A skipped line never blocks the order.
        let mut skipped_lines = Vec::new();
        for item in &items {
            let applied = self
                .inventory
                .try_decrement_stock(&item.release_id, &item.sku, item.qty)
                .await?;
            if !applied {
                skipped_lines.push(item.sku.clone());
                self.event_sender
                    .send(Event::StockShortfall {
                        order_id,
                        release_id: item.release_id.clone(),
                        sku: item.sku.clone(),
                        requested: item.qty,
                    })
                    .await;
            }
        }

        // A completed checkout always empties the server-side cart.
        cart::Entity::delete_by_id(uid.clone()).exec(&*self.db).await?;
        self.event_sender
            .send(Event::CartCleared {
                user_id: uid.clone(),
            })
            .await;

        info!(%order_id, %subtotal, "order materialized from checkout session");
        self.event_sender
            .send(Event::OrderCreated {
                order_id,
                session_id: session.id.clone(),
                user_id: uid,
                grand_total: subtotal,
            })
            .await;

        Ok(ReconcileOutcome::OrderCreated {
            order_id,
            skipped_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_is_deterministic_per_session() {
        let a = order_id_for_session("cs_test_123");
        let b = order_id_for_session("cs_test_123");
        let c = order_id_for_session("cs_test_456");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
