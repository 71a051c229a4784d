/// Registration, login, and logout endpoints
use crate::{
    account::{AccountResponse, LoginRequest, LoginResponse, RegisterRequest},
    auth::AuthContext,
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::json;

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Register a new customer account
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    tracing::info!("register: creating account for {}", req.email);

    let account = ctx.accounts.register(req).await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Exchange credentials for an access token
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (account, token) = ctx.accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        account_id: account.id,
        role: account.role,
    }))
}

/// Revoke the presented bearer token
async fn logout(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.accounts.revoke_token(&auth.token).await?;

    tracing::info!("logout: revoked token for account {}", auth.account.id);

    Ok(Json(json!({ "message": "Logged out" })))
}
