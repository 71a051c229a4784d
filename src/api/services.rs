/// Service catalog endpoints; writes are admin-gated
use crate::{
    auth::{AdminAuthContext, OptionalAuthContext},
    catalog::{BulkActionRequest, BulkActionResponse, CreateServiceRequest, UpdateServiceRequest},
    context::AppContext,
    db::models::Service,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Build catalog routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/:id",
            get(get_service)
                .put(update_service)
                .patch(update_service)
                .delete(delete_service),
        )
        .route("/services/bulk-action", post(bulk_action))
}

/// List catalog entries; only admins see inactive services
async fn list_services(
    State(ctx): State<AppContext>,
    maybe_auth: OptionalAuthContext,
) -> ApiResult<Json<Vec<Service>>> {
    let include_inactive = maybe_auth
        .auth
        .map(|auth| auth.account.role.is_admin())
        .unwrap_or(false);

    let services = ctx.catalog.list_services(include_inactive).await?;

    Ok(Json(services))
}

/// Get one catalog entry
async fn get_service(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Service>> {
    let service = ctx.catalog.get_service(id).await?;

    Ok(Json(service))
}

/// Create a catalog entry
async fn create_service(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<CreateServiceRequest>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let service = ctx.catalog.create_service(req).await?;

    tracing::info!("Created service {} ({})", service.id, service.name);

    Ok((StatusCode::CREATED, Json(service)))
}

/// Apply a partial update to a catalog entry
async fn update_service(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateServiceRequest>,
) -> ApiResult<Json<Service>> {
    let service = ctx.catalog.update_service(id, req).await?;

    Ok(Json(service))
}

/// Delete a catalog entry
async fn delete_service(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.catalog.delete_service(id).await?;

    Ok(Json(json!({ "message": "Service deleted" })))
}

/// Activate, deactivate, or delete a batch of services
async fn bulk_action(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<BulkActionRequest>,
) -> ApiResult<Json<BulkActionResponse>> {
    let affected = ctx.catalog.bulk_action(req.action, &req.ids).await?;

    Ok(Json(BulkActionResponse { affected }))
}
