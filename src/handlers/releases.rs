use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::common::{no_content_response, success_response, Paginated, PaginationParams};
use crate::{
    auth::{AdminUser, AuthenticatedUser},
    errors::ServiceError,
    services::catalog::{CreateReleaseInput, FormatInput, UpdateReleaseInput},
    AppState,
};

/// List releases (archived hidden)
#[utoipa::path(
    get,
    path = "/api/v1/releases",
    params(PaginationParams),
    responses((status = 200, description = "Page of releases")),
    tag = "Releases"
)]
pub async fn list_releases(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (items, total) = state
        .services
        .catalog
        .list_releases(params.page, params.per_page)
        .await?;
    Ok(success_response(Paginated::new(items, total, &params)))
}

/// Get one release with its formats
#[utoipa::path(
    get,
    path = "/api/v1/releases/:id",
    responses(
        (status = 200, description = "Release with formats"),
        (status = 404, description = "Unknown release", body = crate::errors::ErrorResponse)
    ),
    tag = "Releases"
)]
pub async fn get_release(
    State(state): State<AppState>,
    Path(release_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let (release, formats) = state.services.catalog.get_release(&release_id).await?;
    Ok(success_response(serde_json::json!({
        "release": release,
        "formats": formats,
    })))
}

/// Create a release (admin)
#[utoipa::path(
    post,
    path = "/api/v1/releases",
    request_body = CreateReleaseInput,
    responses(
        (status = 201, description = "Release created"),
        (status = 403, description = "Not an admin", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn create_release(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateReleaseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let release = state.services.catalog.create_release(payload).await?;
    info!(release_id = %release.id, admin = %admin.0.uid, "release created");
    Ok(super::common::created_response(release))
}

/// Update a release (admin)
#[utoipa::path(
    put,
    path = "/api/v1/releases/:id",
    request_body = UpdateReleaseInput,
    responses(
        (status = 200, description = "Release updated"),
        (status = 404, description = "Unknown release", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn update_release(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(release_id): Path<String>,
    Json(payload): Json<UpdateReleaseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let release = state
        .services
        .catalog
        .update_release(&release_id, payload)
        .await?;
    Ok(success_response(release))
}

/// Create or update one format of a release, keyed by SKU (admin)
#[utoipa::path(
    put,
    path = "/api/v1/releases/:id/formats",
    request_body = FormatInput,
    responses(
        (status = 200, description = "Format upserted"),
        (status = 404, description = "Unknown release", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn upsert_format(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(release_id): Path<String>,
    Json(payload): Json<FormatInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let format = state
        .services
        .catalog
        .upsert_format(&release_id, payload)
        .await?;
    Ok(success_response(format))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub sku: String,
    pub stock: i32,
}

/// Set the absolute stock level of a SKU (admin)
#[utoipa::path(
    put,
    path = "/api/v1/releases/:id/stock",
    request_body = SetStockRequest,
    responses(
        (status = 204, description = "Stock updated"),
        (status = 404, description = "Unknown SKU", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(release_id): Path<String>,
    Json(payload): Json<SetStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .inventory
        .set_stock(&release_id, &payload.sku, payload.stock)
        .await?;
    Ok(no_content_response())
}

/// Archive a release (admin soft delete)
#[utoipa::path(
    delete,
    path = "/api/v1/releases/:id",
    responses(
        (status = 204, description = "Release archived"),
        (status = 404, description = "Unknown release", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn archive_release(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(release_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.archive_release(&release_id).await?;
    info!(release_id, admin = %admin.0.uid, "release archived");
    Ok(no_content_response())
}

/// Enrich a release from MusicBrainz and the Cover Art Archive
#[utoipa::path(
    post,
    path = "/api/v1/releases/:id/enrich",
    responses(
        (status = 200, description = "Enrichment applied", body = crate::services::enrichment::EnrichmentResult),
        (status = 404, description = "Unknown release or no metadata match", body = crate::errors::ErrorResponse),
        (status = 502, description = "Metadata service unavailable", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Releases"
)]
pub async fn enrich_release(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(release_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.enrichment.enrich_release(&release_id).await?;
    info!(release_id, uid = %user.uid, mbid = %result.mbid, "release enriched");
    Ok(success_response(result))
}

pub fn release_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_releases))
        .route("/", post(create_release))
        .route("/:id", get(get_release))
        .route("/:id", put(update_release))
        .route("/:id", delete(archive_release))
        .route("/:id/formats", put(upsert_format))
        .route("/:id/stock", put(set_stock))
        .route("/:id/enrich", post(enrich_release))
}
