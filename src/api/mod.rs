/// API routes and handlers
pub mod auth;
pub mod bookings;
pub mod middleware;
pub mod services;
pub mod settings;
pub mod users;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(services::routes())
        .merge(bookings::routes())
        .merge(settings::routes())
}
