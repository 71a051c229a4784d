/// Business availability settings endpoints
///
/// The aggregate is publicly readable (clients book against it); all
/// mutation is admin-gated.
use crate::{
    auth::AdminAuthContext,
    availability::{
        BusinessSettingsResponse, HolidayInput, TimeSlotInput, UnavailableDateInput,
        UpdateBusinessSettingsRequest,
    },
    context::AppContext,
    db::models::{BookableTimeSlot, Holiday, UnavailableDate},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

/// Build settings routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/settings", get(get_settings).put(replace_settings))
        .route("/admin/settings/holidays", post(add_holiday))
        .route("/admin/settings/holidays/:id", delete(remove_holiday))
        .route("/admin/settings/unavailable-dates", post(add_unavailable_date))
        .route(
            "/admin/settings/unavailable-dates/:id",
            delete(remove_unavailable_date),
        )
        .route("/admin/settings/time-slots", post(add_time_slot))
        .route("/admin/settings/time-slots/:id", delete(remove_time_slot))
}

/// The full availability surface
async fn get_settings(
    State(ctx): State<AppContext>,
) -> ApiResult<Json<BusinessSettingsResponse>> {
    let settings = ctx.availability.get_settings().await?;

    Ok(Json(settings))
}

/// Replace supplied collections wholesale
async fn replace_settings(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<UpdateBusinessSettingsRequest>,
) -> ApiResult<Json<BusinessSettingsResponse>> {
    let settings = ctx.availability.replace_settings(req).await?;

    tracing::info!("Business settings replaced");

    Ok(Json(settings))
}

/// Add a holiday date
async fn add_holiday(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<HolidayInput>,
) -> ApiResult<(StatusCode, Json<Holiday>)> {
    let holiday = ctx.availability.add_holiday(req).await?;

    Ok((StatusCode::CREATED, Json(holiday)))
}

/// Remove a holiday
async fn remove_holiday(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.availability.remove_holiday(id).await?;

    Ok(Json(json!({ "message": "Holiday removed" })))
}

/// Add a blackout date
async fn add_unavailable_date(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<UnavailableDateInput>,
) -> ApiResult<(StatusCode, Json<UnavailableDate>)> {
    let date = ctx.availability.add_unavailable_date(req).await?;

    Ok((StatusCode::CREATED, Json(date)))
}

/// Remove a blackout date
async fn remove_unavailable_date(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.availability.remove_unavailable_date(id).await?;

    Ok(Json(json!({ "message": "Unavailable date removed" })))
}

/// Add a bookable time slot
async fn add_time_slot(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Json(req): Json<TimeSlotInput>,
) -> ApiResult<(StatusCode, Json<BookableTimeSlot>)> {
    let slot = ctx.availability.add_time_slot(req).await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

/// Remove a bookable time slot
async fn remove_time_slot(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.availability.remove_time_slot(id).await?;

    Ok(Json(json!({ "message": "Time slot removed" })))
}
