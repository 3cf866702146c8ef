use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::{
    errors::ServiceError,
    gateway::{signature, PaymentEvent},
    services::reconciler::ReconcileOutcome,
    AppState,
};

/// Payment gateway webhook receiver
///
/// The raw body is needed byte-for-byte for signature verification, so
/// this handler takes `Bytes` and parses JSON only after the HMAC check
/// passes.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body = String,
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Invalid signature or payload", body = crate::errors::ErrorResponse),
        (status = 500, description = "Receiver misconfigured or store failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let Some(secret) = state.config.stripe_webhook_secret.as_deref() else {
        error!("webhook received but no signing secret is configured");
        return Err(ServiceError::InternalError(
            "webhook receiver is not configured".to_string(),
        ));
    };

    let header = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !signature::verify_signature(
        header,
        &body,
        secret,
        state.config.stripe_webhook_tolerance_secs,
    ) {
        warn!("webhook signature verification failed");
        return Err(ServiceError::InvalidArgument(
            "invalid webhook signature".to_string(),
        ));
    }

    let event: PaymentEvent = serde_json::from_slice(&body).map_err(|e| {
        ServiceError::InvalidArgument(format!("malformed event payload: {e}"))
    })?;

    match state.services.reconciler.process_event(&event).await? {
        ReconcileOutcome::Ignored => {
            info!(event_type = %event.event_type, "event type not handled");
        }
        ReconcileOutcome::AlreadyProcessed { order_id } => {
            info!(%order_id, "event already reconciled");
        }
        ReconcileOutcome::OrderCreated {
            order_id,
            skipped_lines,
        } => {
            info!(%order_id, skipped = skipped_lines.len(), "order reconciled");
        }
    }

    Ok(Json(serde_json::json!({ "received": true })))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/webhook", post(payment_webhook))
}
