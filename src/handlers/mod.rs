pub mod checkout;
pub mod common;
pub mod contact;
pub mod health;
pub mod merch;
pub mod orders;
pub mod payment_webhooks;
pub mod releases;

use axum::Router;

use crate::AppState;

/// Everything under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/checkout", checkout::checkout_routes())
        .nest("/payments", payment_webhooks::payment_routes())
        .nest("/releases", releases::release_routes())
        .nest("/merch", merch::merch_routes())
        .nest("/orders", orders::order_routes())
        .nest("/contact", contact::contact_routes())
}
