/// Service catalog manager
use crate::{
    catalog::{BulkAction, CreateServiceRequest, UpdateServiceRequest},
    db::models::Service,
    error::{ApiError, ApiResult},
};
use sqlx::SqlitePool;

/// Catalog manager service
pub struct ServiceManager {
    db: SqlitePool,
}

impl ServiceManager {
    /// Create a new catalog manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a catalog entry
    pub async fn create_service(&self, req: CreateServiceRequest) -> ApiResult<Service> {
        validate_name(&req.name)?;
        validate_pricing(req.price, req.min_duration_minutes, req.max_duration_minutes)?;

        if self.name_exists(&req.name, None).await? {
            return Err(ApiError::Duplicate(format!(
                "Service '{}' already exists",
                req.name
            )));
        }

        let is_active = req.is_active.unwrap_or(true);

        let result = sqlx::query(
            "INSERT INTO services (name, description, price, min_duration_minutes,
                                   max_duration_minutes, is_active, category, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.price)
        .bind(req.min_duration_minutes)
        .bind(req.max_duration_minutes)
        .bind(is_active)
        .bind(&req.category)
        .bind(&req.image_url)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(Service {
            id: result.last_insert_rowid(),
            name: req.name,
            description: req.description,
            price: req.price,
            min_duration_minutes: req.min_duration_minutes,
            max_duration_minutes: req.max_duration_minutes,
            is_active,
            category: req.category,
            image_url: req.image_url,
        })
    }

    /// Get a service by id
    pub async fn get_service(&self, id: i64) -> ApiResult<Service> {
        sqlx::query_as::<_, Service>(
            "SELECT id, name, description, price, min_duration_minutes, max_duration_minutes,
                    is_active, category, image_url
             FROM services WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
    }

    /// List services; inactive entries are only visible when requested
    pub async fn list_services(&self, include_inactive: bool) -> ApiResult<Vec<Service>> {
        let query = if include_inactive {
            sqlx::query_as::<_, Service>(
                "SELECT id, name, description, price, min_duration_minutes, max_duration_minutes,
                        is_active, category, image_url
                 FROM services ORDER BY name",
            )
        } else {
            sqlx::query_as::<_, Service>(
                "SELECT id, name, description, price, min_duration_minutes, max_duration_minutes,
                        is_active, category, image_url
                 FROM services WHERE is_active = 1 ORDER BY name",
            )
        };

        query.fetch_all(&self.db).await.map_err(ApiError::Database)
    }

    /// Apply a partial update and return the merged service
    pub async fn update_service(&self, id: i64, req: UpdateServiceRequest) -> ApiResult<Service> {
        let mut service = self.get_service(id).await?;

        if let Some(name) = req.name {
            validate_name(&name)?;
            if name != service.name && self.name_exists(&name, Some(id)).await? {
                return Err(ApiError::Duplicate(format!(
                    "Service '{}' already exists",
                    name
                )));
            }
            service.name = name;
        }
        if let Some(description) = req.description {
            service.description = Some(description);
        }
        if let Some(price) = req.price {
            service.price = price;
        }
        if let Some(min) = req.min_duration_minutes {
            service.min_duration_minutes = min;
        }
        if let Some(max) = req.max_duration_minutes {
            service.max_duration_minutes = max;
        }
        if let Some(is_active) = req.is_active {
            service.is_active = is_active;
        }
        if let Some(category) = req.category {
            service.category = Some(category);
        }
        if let Some(image_url) = req.image_url {
            service.image_url = Some(image_url);
        }

        validate_pricing(
            service.price,
            service.min_duration_minutes,
            service.max_duration_minutes,
        )?;

        sqlx::query(
            "UPDATE services
             SET name = ?1, description = ?2, price = ?3, min_duration_minutes = ?4,
                 max_duration_minutes = ?5, is_active = ?6, category = ?7, image_url = ?8
             WHERE id = ?9",
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .bind(service.min_duration_minutes)
        .bind(service.max_duration_minutes)
        .bind(service.is_active)
        .bind(&service.category)
        .bind(&service.image_url)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(service)
    }

    /// Delete a service
    pub async fn delete_service(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Service not found".to_string()));
        }

        Ok(())
    }

    /// Apply a bulk action to a set of services in one transaction
    ///
    /// A missing id aborts the whole batch.
    pub async fn bulk_action(&self, action: BulkAction, ids: &[i64]) -> ApiResult<u64> {
        if ids.is_empty() {
            return Err(ApiError::Validation("No service ids supplied".to_string()));
        }

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;
        let mut affected = 0u64;

        for id in ids {
            let result = match action {
                BulkAction::Activate => {
                    sqlx::query("UPDATE services SET is_active = 1 WHERE id = ?1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                }
                BulkAction::Deactivate => {
                    sqlx::query("UPDATE services SET is_active = 0 WHERE id = ?1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                }
                BulkAction::Delete => {
                    sqlx::query("DELETE FROM services WHERE id = ?1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                }
            }
            .map_err(ApiError::Database)?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls the batch back
                return Err(ApiError::NotFound(format!("Service {} not found", id)));
            }

            affected += result.rows_affected();
        }

        tx.commit().await.map_err(ApiError::Database)?;

        Ok(affected)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> ApiResult<bool> {
        let row = match exclude_id {
            Some(id) => sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM services WHERE name = ?1 AND id != ?2",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.db)
            .await,
            None => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services WHERE name = ?1")
                .bind(name)
                .fetch_one(&self.db)
                .await,
        }
        .map_err(ApiError::Database)?;

        Ok(row > 0)
    }
}

fn validate_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation(
            "Service name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_pricing(price: f64, min_duration: i64, max_duration: i64) -> ApiResult<()> {
    if price < 0.0 {
        return Err(ApiError::Validation(
            "Price cannot be negative".to_string(),
        ));
    }

    if min_duration <= 0 {
        return Err(ApiError::Validation(
            "Minimum duration must be positive".to_string(),
        ));
    }

    if max_duration < min_duration {
        return Err(ApiError::Validation(
            "Maximum duration cannot be shorter than minimum duration".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_manager() -> ServiceManager {
        let db = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                price REAL NOT NULL,
                min_duration_minutes INTEGER NOT NULL,
                max_duration_minutes INTEGER NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                category TEXT,
                image_url TEXT
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        ServiceManager::new(db)
    }

    fn manicure_request() -> CreateServiceRequest {
        CreateServiceRequest {
            name: "Gel Manicure".to_string(),
            description: Some("Gel polish with cuticle care".to_string()),
            price: 45.0,
            min_duration_minutes: 45,
            max_duration_minutes: 60,
            is_active: None,
            category: Some("manicure".to_string()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_service() {
        let manager = create_test_manager().await;

        let service = manager.create_service(manicure_request()).await.unwrap();
        assert!(service.is_active);

        let fetched = manager.get_service(service.id).await.unwrap();
        assert_eq!(fetched.name, "Gel Manicure");
        assert_eq!(fetched.min_duration_minutes, 45);
        assert_eq!(fetched.max_duration_minutes, 60);
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let manager = create_test_manager().await;

        manager.create_service(manicure_request()).await.unwrap();
        let result = manager.create_service(manicure_request()).await;

        assert!(matches!(result, Err(ApiError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_create_inverted_duration_range() {
        let manager = create_test_manager().await;

        let mut req = manicure_request();
        req.min_duration_minutes = 60;
        req.max_duration_minutes = 30;

        let result = manager.create_service(req).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_service_partial() {
        let manager = create_test_manager().await;

        let service = manager.create_service(manicure_request()).await.unwrap();

        let updated = manager
            .update_service(
                service.id,
                UpdateServiceRequest {
                    price: Some(50.0),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, 50.0);
        assert!(!updated.is_active);
        // Untouched fields survive
        assert_eq!(updated.name, "Gel Manicure");
    }

    #[tokio::test]
    async fn test_update_missing_service() {
        let manager = create_test_manager().await;

        let result = manager
            .update_service(999, UpdateServiceRequest::default())
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_inactive() {
        let manager = create_test_manager().await;

        manager.create_service(manicure_request()).await.unwrap();

        let mut inactive = manicure_request();
        inactive.name = "Discontinued Pedicure".to_string();
        inactive.is_active = Some(false);
        manager.create_service(inactive).await.unwrap();

        let public = manager.list_services(false).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].name, "Gel Manicure");

        let all = manager.list_services(true).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_deactivate() {
        let manager = create_test_manager().await;

        let a = manager.create_service(manicure_request()).await.unwrap();
        let mut second = manicure_request();
        second.name = "Classic Pedicure".to_string();
        let b = manager.create_service(second).await.unwrap();

        let affected = manager
            .bulk_action(BulkAction::Deactivate, &[a.id, b.id])
            .await
            .unwrap();
        assert_eq!(affected, 2);

        assert!(!manager.get_service(a.id).await.unwrap().is_active);
        assert!(!manager.get_service(b.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_bulk_action_rolls_back_on_missing_id() {
        let manager = create_test_manager().await;

        let service = manager.create_service(manicure_request()).await.unwrap();

        let result = manager
            .bulk_action(BulkAction::Delete, &[service.id, 999])
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));

        // The whole batch rolled back; the first service is still there
        manager.get_service(service.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_bulk_action_empty_ids() {
        let manager = create_test_manager().await;

        let result = manager.bulk_action(BulkAction::Activate, &[]).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
