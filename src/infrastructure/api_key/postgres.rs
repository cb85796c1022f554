//! PostgreSQL API key repository
//!
//! Keys live in a dedicated `auth_api_keys` table rather than the generic
//! document store so the database can enforce secret uniqueness.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::api_key::{ApiKeyId, ApiKeyRecord, ApiKeyRepository, PermissionSet};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

const SELECT_COLUMNS: &str =
    "id, created_at, secret, description, permissions, expires_at, revoked";

#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_api_keys (
                id UUID PRIMARY KEY,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                secret VARCHAR(32) NOT NULL UNIQUE,
                description TEXT,
                permissions TEXT[] NOT NULL DEFAULT '{}',
                expires_at TIMESTAMPTZ,
                revoked BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create auth_api_keys: {}", e)))?;

        Ok(())
    }

    fn parse_record(row: &PgRow) -> Result<ApiKeyRecord, DomainError> {
        let id: Uuid = row.get("id");
        let created_at: DateTime<Utc> = row.get("created_at");
        let secret: String = row.get("secret");
        let description: Option<String> = row.get("description");
        let tokens: Vec<String> = row.get("permissions");
        let expires_at: Option<DateTime<Utc>> = row.get("expires_at");
        let revoked: bool = row.get("revoked");

        let permissions = PermissionSet::from_tokens(&tokens).map_err(|e| {
            DomainError::storage(format!("Stored API key '{}' is invalid: {}", id, e))
        })?;

        Ok(ApiKeyRecord::restore(
            ApiKeyId::from_uuid(id),
            created_at,
            secret,
            description,
            permissions,
            expires_at,
            revoked,
        ))
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        let query = format!("SELECT {} FROM auth_api_keys WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(Self::parse_record).transpose()
    }

    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM auth_api_keys WHERE secret = $1",
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(secret)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(Self::parse_record).transpose()
    }

    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO auth_api_keys
                (id, created_at, secret, description, permissions, expires_at, revoked)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.created_at())
        .bind(record.secret())
        .bind(record.description())
        .bind(record.permissions().to_tokens())
        .bind(record.expires_at())
        .bind(record.is_revoked())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("API key secret already exists")
            } else {
                DomainError::storage(format!("Failed to create API key: {}", e))
            }
        })?;

        Ok(record)
    }

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        // Only the mutable columns are written
        let result = sqlx::query(
            r#"
            UPDATE auth_api_keys
            SET description = $2, permissions = $3, expires_at = $4, revoked = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.description())
        .bind(record.permissions().to_tokens())
        .bind(record.expires_at())
        .bind(record.is_revoked())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update API key: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "API key '{}' not found",
                record.id()
            )));
        }

        Ok(record.clone())
    }

    async fn secret_exists(&self, secret: &str) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM auth_api_keys WHERE secret = $1) AS taken")
            .bind(secret)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check API key secret: {}", e)))?;

        Ok(row.get("taken"))
    }
}
