//! Deadwax API Library
//!
//! Storefront backend for physical music media. Checkout is delegated
//! to a hosted payment gateway; orders are materialized from the
//! gateway's completion webhooks.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use handlers::api_v1_routes;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: auth::SharedAuthService,
    pub services: services::AppServices,
    pub event_sender: events::EventSender,
}

/// Full application router over a prepared state: health probes, the
/// versioned API and the Swagger UI. Shared between `main` and the
/// integration-test harness.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", handlers::health::health_routes())
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}
