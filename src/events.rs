use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the services. Consumed in-process by a
/// logging worker; the channel is the seam where outbound notification
/// (email, ops alerting) would attach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutSessionCreated {
        session_id: String,
        user_id: String,
        line_count: usize,
    },
    OrderCreated {
        order_id: Uuid,
        session_id: String,
        user_id: String,
        grand_total: Decimal,
    },
    /// A paid line could not be fulfilled from stock; needs operator
    /// follow-up (refund or backorder).
    StockShortfall {
        order_id: Uuid,
        release_id: String,
        sku: String,
        requested: i32,
    },
    CartCleared {
        user_id: String,
    },
    ContactMessageReceived {
        message_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; a full or closed channel is logged and swallowed
    /// so event emission never fails a request.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("failed to publish event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Spawned at startup.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::StockShortfall {
                order_id,
                release_id,
                sku,
                requested,
            } => {
                warn!(
                    %order_id,
                    release_id,
                    sku,
                    requested,
                    "stock shortfall on paid order line; operator follow-up required"
                );
            }
            other => info!(event = ?other, "event"),
        }
    }
}
