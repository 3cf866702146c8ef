use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::post,
    Router,
};
use tracing::info;

use crate::{
    auth::AuthenticatedUser,
    errors::ServiceError,
    services::checkout::CreateCheckoutSessionInput,
    AppState,
};

/// Create a hosted checkout session for the signed-in buyer
#[utoipa::path(
    post,
    path = "/api/v1/checkout/session",
    request_body = CreateCheckoutSessionInput,
    responses(
        (status = 200, description = "Session created; body carries the redirect URL"),
        (status = 400, description = "Invalid cart payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse),
        (status = 500, description = "Payment gateway rejected the request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCheckoutSessionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state
        .services
        .checkout
        .create_session(&user, payload)
        .await?;

    info!(session_id = %session.id, uid = %user.uid, "checkout session issued");
    Ok(Json(serde_json::json!({
        "id": session.id,
        "url": session.url,
    })))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/session", post(create_checkout_session))
}
