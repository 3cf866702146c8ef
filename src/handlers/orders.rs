use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::common::{success_response, Paginated, PaginationParams};
use crate::{
    auth::{AdminUser, AuthenticatedUser},
    errors::ServiceError,
    AppState,
};

/// List the signed-in buyer's orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses((status = 200, description = "The buyer's orders")),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_for_user(&user.uid).await?;
    Ok(success_response(orders))
}

/// Get one order with its lines (owner or admin)
#[utoipa::path(
    get,
    path = "/api/v1/orders/:id",
    responses(
        (status = 200, description = "Order with lines"),
        (status = 403, description = "Order belongs to another account", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let (order, lines) = state
        .services
        .orders
        .get_order(order_id, &user.uid, user.is_admin)
        .await?;
    Ok(success_response(serde_json::json!({
        "order": order,
        "items": lines,
    })))
}

/// List all orders (admin)
#[utoipa::path(
    get,
    path = "/api/v1/orders/all",
    params(PaginationParams),
    responses((status = 200, description = "Page of orders")),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .orders
        .list_all(params.page, params.per_page)
        .await?;
    Ok(success_response(Paginated::new(items, total, &params)))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_orders))
        .route("/all", get(list_all_orders))
        .route("/:id", get(get_order))
}
