pub mod catalog;
pub mod checkout;
pub mod enrichment;
pub mod inventory;
pub mod orders;
pub mod reconciler;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::gateway::PaymentGateway;

/// Service container handed to every handler through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub checkout: Arc<checkout::CheckoutService>,
    pub reconciler: Arc<reconciler::ReconcilerService>,
    pub inventory: Arc<inventory::InventoryService>,
    pub catalog: Arc<catalog::CatalogService>,
    pub orders: Arc<orders::OrderService>,
    pub enrichment: Arc<enrichment::EnrichmentService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Arc<dyn PaymentGateway>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Result<Self, ServiceError> {
        let inventory = Arc::new(inventory::InventoryService::new(db.clone()));
        let checkout = Arc::new(checkout::CheckoutService::new(
            gateway,
            event_sender.clone(),
            config.default_currency.clone(),
        ));
        let reconciler = Arc::new(reconciler::ReconcilerService::new(
            db.clone(),
            inventory.clone(),
            event_sender.clone(),
        ));
        let catalog = Arc::new(catalog::CatalogService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let orders = Arc::new(orders::OrderService::new(db.clone()));
        let enrichment = Arc::new(enrichment::EnrichmentService::new(
            db,
            config.musicbrainz_api_base.clone(),
            config.coverart_api_base.clone(),
            config.metadata_user_agent.clone(),
        )?);

        Ok(Self {
            checkout,
            reconciler,
            inventory,
            catalog,
            orders,
            enrichment,
        })
    }
}
