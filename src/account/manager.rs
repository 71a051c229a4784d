/// Account manager implementation using runtime queries
///
/// Owns registration, credential verification, access-token issuance and
/// validation, and the revoked-token blacklist.

use crate::{
    account::{RegisterRequest, UpdateProfileRequest},
    config::ServerConfig,
    db::models::{Account, Role},
    error::{ApiError, ApiResult},
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Access token claims; `sub` carries the account identifier
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    role: String,
    iat: i64,
    exp: i64,
}

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new customer account
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<Account> {
        self.validate_email(&req.email)?;
        self.validate_password(&req.password)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::Validation("Name cannot be empty".to_string()));
        }

        if self.email_exists(&req.email).await? {
            return Err(ApiError::Duplicate("Email already registered".to_string()));
        }

        let password_hash = hash_password(&req.password)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO accounts (email, password_hash, name, phone, role,
                                   email_notifications_enabled, sms_notifications_enabled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&req.email)
        .bind(&password_hash)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(Role::Customer)
        .bind(true)
        .bind(false)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(Account {
            id: result.last_insert_rowid(),
            email: req.email,
            password_hash,
            name: req.name,
            phone: req.phone,
            role: Role::Customer,
            avatar_url: None,
            email_notifications_enabled: true,
            sms_notifications_enabled: false,
            created_at: now,
        })
    }

    /// Authenticate credentials and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(Account, String)> {
        let account = self
            .find_account_by_email(email)
            .await?
            .ok_or_else(|| ApiError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(password, &account.password_hash) {
            return Err(ApiError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.generate_access_token(&account)?;

        Ok((account, token))
    }

    /// Validate a bearer token and load the account it names
    ///
    /// Signature and expiry are checked first, then the revocation
    /// blacklist, then the subject account is loaded.
    pub async fn validate_access_token(&self, token: &str) -> ApiResult<Account> {
        let claims = self.decode_access_token(token)?;

        if self.is_token_revoked(token).await? {
            return Err(ApiError::Authentication("Token has been revoked".to_string()));
        }

        self.get_account(claims.sub).await
    }

    /// Add a token to the revocation blacklist (logout)
    ///
    /// Re-revoking an already blacklisted token is a no-op.
    pub async fn revoke_token(&self, token: &str) -> ApiResult<()> {
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (token, revoked_at) VALUES (?1, ?2)")
            .bind(token)
            .bind(Utc::now())
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Check whether a token has been revoked
    pub async fn is_token_revoked(&self, token: &str) -> ApiResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM revoked_tokens WHERE token = ?1")
            .bind(token)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// Get account by id
    pub async fn get_account(&self, id: i64) -> ApiResult<Account> {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, name, phone, role, avatar_url,
                    email_notifications_enabled, sms_notifications_enabled, created_at
             FROM accounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
    }

    /// Apply a partial profile update and return the merged account
    pub async fn update_profile(&self, id: i64, req: UpdateProfileRequest) -> ApiResult<Account> {
        let mut account = self.get_account(id).await?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("Name cannot be empty".to_string()));
            }
            account.name = name;
        }
        if let Some(phone) = req.phone {
            account.phone = Some(phone);
        }
        if let Some(avatar_url) = req.avatar_url {
            account.avatar_url = Some(avatar_url);
        }
        if let Some(enabled) = req.email_notifications_enabled {
            account.email_notifications_enabled = enabled;
        }
        if let Some(enabled) = req.sms_notifications_enabled {
            account.sms_notifications_enabled = enabled;
        }

        sqlx::query(
            "UPDATE accounts
             SET name = ?1, phone = ?2, avatar_url = ?3,
                 email_notifications_enabled = ?4, sms_notifications_enabled = ?5
             WHERE id = ?6",
        )
        .bind(&account.name)
        .bind(&account.phone)
        .bind(&account.avatar_url)
        .bind(account.email_notifications_enabled)
        .bind(account.sms_notifications_enabled)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(account)
    }

    /// Change password after verifying the current one
    pub async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let account = self.get_account(id).await?;

        if !verify_password(current_password, &account.password_hash) {
            return Err(ApiError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        self.validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE accounts SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> ApiResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, name, phone, role, avatar_url,
                    email_notifications_enabled, sms_notifications_enabled, created_at
             FROM accounts WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)
    }

    async fn email_exists(&self, email: &str) -> ApiResult<bool> {
        Ok(self.find_account_by_email(email).await?.is_some())
    }

    /// Generate an access JWT for an account
    fn generate_access_token(&self, account: &Account) -> ApiResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account.id,
            role: account.role.as_str().to_string(),
            iat: now,
            exp: now + self.config.authentication.access_token_ttl_minutes * 60,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Decode and verify an access JWT (signature and expiry)
    fn decode_access_token(&self, token: &str) -> ApiResult<Claims> {
        use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                ApiError::Authentication("Token expired".to_string())
            }
            _ => ApiError::Authentication("Invalid token".to_string()),
        })
    }

    /// Validate email format
    fn validate_email(&self, email: &str) -> ApiResult<()> {
        // Basic email validation
        if !email.contains('@') || email.trim().is_empty() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        Ok(())
    }

    /// Validate password strength
    fn validate_password(&self, password: &str) -> ApiResult<()> {
        if password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// Hash a password with Argon2id and a fresh random salt
fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash
fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, LoggingConfig, ServiceConfig, StorageConfig};

    fn test_config() -> ServerConfig {
        ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 8000,
                version: "0.1.0".to_string(),
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: "./data/test.sqlite".into(),
            },
            authentication: AuthConfig {
                jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
                access_token_ttl_minutes: 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    async fn create_test_manager() -> AccountManager {
        // Create in-memory database
        let db = SqlitePool::connect(":memory:").await.unwrap();

        // Create tables
        sqlx::query(
            r#"
            CREATE TABLE accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                phone TEXT,
                role TEXT NOT NULL DEFAULT 'customer',
                avatar_url TEXT,
                email_notifications_enabled BOOLEAN NOT NULL DEFAULT 1,
                sms_notifications_enabled BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE revoked_tokens (
                token TEXT PRIMARY KEY,
                revoked_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        AccountManager::new(db, Arc::new(test_config()))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "password123".to_string(),
            name: "Test Customer".to_string(),
            phone: Some("555-0100".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let manager = create_test_manager().await;

        let account = manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        assert_eq!(account.email, "test@example.com");
        assert_eq!(account.role, Role::Customer);
        assert_ne!(account.password_hash, "password123");

        let (logged_in, token) = manager
            .login("test@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(logged_in.id, account.id);
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let manager = create_test_manager().await;

        manager
            .register(register_request("taken@example.com"))
            .await
            .unwrap();

        let result = manager.register(register_request("taken@example.com")).await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Duplicate(_) => {}
            other => panic!("Expected Duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let manager = create_test_manager().await;

        let result = manager.register(register_request("not-an-email")).await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Validation(_) => {}
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let manager = create_test_manager().await;

        let mut req = register_request("short@example.com");
        req.password = "12345".to_string();

        let result = manager.register(req).await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Validation(_) => {}
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let manager = create_test_manager().await;

        manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let result = manager.login("test@example.com", "wrong-password").await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Authentication(_) => {}
            other => panic!("Expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let manager = create_test_manager().await;

        let result = manager.login("nobody@example.com", "password123").await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Authentication(_) => {}
            other => panic!("Expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validate_access_token() {
        let manager = create_test_manager().await;

        let account = manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let (_, token) = manager
            .login("test@example.com", "password123")
            .await
            .unwrap();

        let validated = manager.validate_access_token(&token).await.unwrap();
        assert_eq!(validated.id, account.id);
        assert_eq!(validated.email, "test@example.com");
    }

    #[tokio::test]
    async fn test_validate_garbage_token() {
        let manager = create_test_manager().await;

        let result = manager.validate_access_token("not-a-jwt").await;

        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Authentication(_) => {}
            other => panic!("Expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let manager = create_test_manager().await;

        manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let (_, token) = manager
            .login("test@example.com", "password123")
            .await
            .unwrap();

        // Valid before revocation
        manager.validate_access_token(&token).await.unwrap();

        manager.revoke_token(&token).await.unwrap();

        // Signature and expiry are still valid, but the blacklist wins
        let result = manager.validate_access_token(&token).await;
        assert!(result.is_err());
        match result.unwrap_err() {
            ApiError::Authentication(_) => {}
            other => panic!("Expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_revoke_token_is_idempotent() {
        let manager = create_test_manager().await;

        manager.revoke_token("some-token").await.unwrap();
        manager.revoke_token("some-token").await.unwrap();

        assert!(manager.is_token_revoked("some-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_change_password() {
        let manager = create_test_manager().await;

        let account = manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        // Wrong current password
        let result = manager
            .change_password(account.id, "wrong", "new-password")
            .await;
        assert!(matches!(result, Err(ApiError::Authentication(_))));

        manager
            .change_password(account.id, "password123", "new-password")
            .await
            .unwrap();

        // Old password no longer works
        assert!(manager.login("test@example.com", "password123").await.is_err());
        manager
            .login("test@example.com", "new-password")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let manager = create_test_manager().await;

        let account = manager
            .register(register_request("test@example.com"))
            .await
            .unwrap();

        let updated = manager
            .update_profile(
                account.id,
                UpdateProfileRequest {
                    name: Some("New Name".to_string()),
                    sms_notifications_enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "New Name");
        assert!(updated.sms_notifications_enabled);
        // Untouched fields survive
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert!(updated.email_notifications_enabled);

        let reloaded = manager.get_account(account.id).await.unwrap();
        assert_eq!(reloaded.name, "New Name");
    }
}
