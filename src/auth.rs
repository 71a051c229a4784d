/// Authentication extractors and utilities
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::Account,
    error::ApiError,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

/// Authenticated context - extracts and validates the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account: Account,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        // Extract bearer token from Authorization header
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        // Verify signature/expiry, consult the blacklist, load the account
        let account = state.accounts.validate_access_token(&token).await?;

        Ok(AuthContext { account, token })
    }
}

/// Optional authenticated context - does not fail if no auth provided
///
/// Used by endpoints that accept both guest and authenticated callers.
#[derive(Debug, Clone)]
pub struct OptionalAuthContext {
    pub auth: Option<AuthContext>,
}

#[async_trait]
impl FromRequestParts<AppContext> for OptionalAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers);

        let auth = if let Some(token) = token {
            match state.accounts.validate_access_token(&token).await {
                Ok(account) => Some(AuthContext { account, token }),
                Err(_) => None,
            }
        } else {
            None
        };

        Ok(OptionalAuthContext { auth })
    }
}

/// Admin authentication context - requires the admin role
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub account: Account,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Authentication("Missing authorization header".to_string()))?;

        let account = state.accounts.validate_access_token(&token).await?;

        if !account.role.is_admin() {
            tracing::warn!("AdminAuthContext: account {} is not an admin", account.id);
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }

        Ok(AdminAuthContext { account, token })
    }
}
