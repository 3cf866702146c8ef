use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use super::common::{
    created_response, no_content_response, success_response, Paginated, PaginationParams,
};
use crate::{
    auth::AdminUser,
    errors::ServiceError,
    services::catalog::SubmitContactMessageInput,
    AppState,
};

/// Submit a contact message (public)
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = SubmitContactMessageInput,
    responses(
        (status = 201, description = "Message accepted"),
        (status = 400, description = "Invalid message", body = crate::errors::ErrorResponse)
    ),
    tag = "Contact"
)]
pub async fn submit_message(
    State(state): State<AppState>,
    Json(payload): Json<SubmitContactMessageInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let message = state
        .services
        .catalog
        .submit_contact_message(payload)
        .await?;
    Ok(created_response(serde_json::json!({ "id": message.id })))
}

/// List contact messages, newest first (admin)
#[utoipa::path(
    get,
    path = "/api/v1/contact",
    params(PaginationParams),
    responses((status = 200, description = "Page of messages")),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .catalog
        .list_contact_messages(params.page, params.per_page)
        .await?;
    Ok(success_response(Paginated::new(items, total, &params)))
}

/// Mark a contact message as read (admin)
#[utoipa::path(
    put,
    path = "/api/v1/contact/:id/read",
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Unknown message", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.mark_contact_message_read(id).await?;
    Ok(no_content_response())
}

/// Delete a contact message (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/contact/:id",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown message", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
pub async fn delete_message(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.delete_contact_message(id).await?;
    Ok(no_content_response())
}

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_message))
        .route("/", get(list_messages))
        .route("/:id/read", put(mark_read))
        .route("/:id", delete(delete_message))
}
