/// Application context and dependency injection
use crate::{
    account::AccountManager,
    availability::AvailabilityManager,
    booking::BookingManager,
    catalog::ServiceManager,
    config::ServerConfig,
    db,
    error::ApiResult,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub catalog: Arc<ServiceManager>,
    pub bookings: Arc<BookingManager>,
    pub availability: Arc<AvailabilityManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Initialize database
        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;

        // Run migrations
        db::run_migrations(&db).await?;

        // Test connection
        db::test_connection(&db).await?;

        let config = Arc::new(config);
        let accounts = Arc::new(AccountManager::new(db.clone(), Arc::clone(&config)));
        let catalog = Arc::new(ServiceManager::new(db.clone()));
        let bookings = Arc::new(BookingManager::new(db.clone()));
        let availability = Arc::new(AvailabilityManager::new(db.clone()));

        Ok(Self {
            config,
            db,
            accounts,
            catalog,
            bookings,
            availability,
        })
    }
}
