/// Booking endpoints
///
/// Creation accepts guests, authenticated customers, and admins acting on
/// behalf of another account; mutation is role-gated per field.
use crate::{
    auth::{AdminAuthContext, AuthContext, OptionalAuthContext},
    booking::{BookingResponse, CreateBookingRequest, UpdateBookingRequest, UpdateStatusRequest},
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

/// Build booking routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_all_bookings))
        .route("/bookings/my", get(list_my_bookings))
        .route(
            "/bookings/:id",
            put(update_booking).delete(delete_booking),
        )
        .route("/bookings/:id/status", put(update_status))
}

/// Create a booking as a guest, the owning account, or an admin
async fn create_booking(
    State(ctx): State<AppContext>,
    maybe_auth: OptionalAuthContext,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let actor = maybe_auth.auth.as_ref().map(|auth| &auth.account);

    let booking = ctx.bookings.create_booking(req, actor).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// List the caller's own bookings
async fn list_my_bookings(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let bookings = ctx.bookings.list_for_account(auth.account.id).await?;

    Ok(Json(bookings))
}

/// List every booking (admin view)
async fn list_all_bookings(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let bookings = ctx.bookings.list_all().await?;

    Ok(Json(bookings))
}

/// General booking update with role-gated field restrictions
async fn update_booking(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookingRequest>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = ctx.bookings.update_booking(id, req, &auth.account).await?;

    Ok(Json(booking))
}

/// Move a booking through the status state machine
async fn update_status(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = ctx.bookings.update_status(id, &req.status).await?;

    Ok(Json(booking))
}

/// Delete a booking
async fn delete_booking(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.bookings.delete_booking(id).await?;

    Ok(Json(json!({ "message": "Booking deleted" })))
}
