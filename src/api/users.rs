/// Self-service profile endpoints
use crate::{
    account::{AccountResponse, ChangePasswordRequest, UpdateProfileRequest},
    auth::AuthContext,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/me/change-password", post(change_password))
}

/// Current account profile
async fn get_me(auth: AuthContext) -> ApiResult<Json<AccountResponse>> {
    Ok(Json(auth.account.into()))
}

/// Apply a partial profile update
async fn update_me(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let account = ctx.accounts.update_profile(auth.account.id, req).await?;

    Ok(Json(account.into()))
}

/// Change password after verifying the current one
async fn change_password(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.accounts
        .change_password(auth.account.id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}
