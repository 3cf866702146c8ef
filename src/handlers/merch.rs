use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::common::{
    created_response, no_content_response, success_response, Paginated, PaginationParams,
};
use crate::{
    auth::AdminUser,
    entities::merch_item,
    errors::ServiceError,
    services::catalog::{CreateMerchInput, UpdateMerchInput},
    AppState,
};

/// List merch items (archived hidden)
#[utoipa::path(
    get,
    path = "/api/v1/merch",
    params(PaginationParams),
    responses((status = 200, description = "Page of merch items")),
    tag = "Merch"
)]
pub async fn list_merch(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let paginator = merch_item::Entity::find()
        .filter(merch_item::Column::IsArchived.eq(false))
        .order_by_asc(merch_item::Column::Id)
        .paginate(&*state.db, params.per_page.max(1));

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page.saturating_sub(1)).await?;
    Ok(success_response(Paginated::new(items, total, &params)))
}

/// Get one merch item
#[utoipa::path(
    get,
    path = "/api/v1/merch/:id",
    responses(
        (status = 200, description = "Merch item"),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    tag = "Merch"
)]
pub async fn get_merch(
    State(state): State<AppState>,
    Path(merch_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = merch_item::Entity::find_by_id(&merch_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("merch {merch_id} not found")))?;
    Ok(success_response(item))
}

/// Create a merch item (admin)
#[utoipa::path(
    post,
    path = "/api/v1/merch",
    request_body = CreateMerchInput,
    responses(
        (status = 201, description = "Merch item created"),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Merch"
)]
pub async fn create_merch(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateMerchInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.catalog.create_merch(payload).await?;
    info!(merch_id = %item.id, admin = %admin.0.uid, "merch item created");
    Ok(created_response(item))
}

/// Update a merch item (admin)
#[utoipa::path(
    put,
    path = "/api/v1/merch/:id",
    request_body = UpdateMerchInput,
    responses(
        (status = 200, description = "Merch item updated"),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Merch"
)]
pub async fn update_merch(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(merch_id): Path<String>,
    Json(payload): Json<UpdateMerchInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.catalog.update_merch(&merch_id, payload).await?;
    Ok(success_response(item))
}

/// Archive a merch item (admin soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/merch/:id",
    responses(
        (status = 204, description = "Merch item archived"),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Merch"
)]
pub async fn archive_merch(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(merch_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.archive_merch(&merch_id).await?;
    info!(merch_id, admin = %admin.0.uid, "merch item archived");
    Ok(no_content_response())
}

pub fn merch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_merch))
        .route("/", post(create_merch))
        .route("/:id", get(get_merch))
        .route("/:id", put(update_merch))
        .route("/:id", delete(archive_merch))
}
