//! Storage factory for runtime storage selection

use std::sync::Arc;

use serde::Deserialize;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::api_key::ApiKeyRepository;
use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{InMemoryApiKeyRepository, PostgresApiKeyRepository};

use super::in_memory::InMemoryStorage;
use super::postgres::{connect_pool, PostgresStorage};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    #[default]
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "in_memory"),
            StorageType::Postgres => write!(f, "postgres"),
        }
    }
}

/// `[storage]` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    /// Required when `storage_type = "postgres"`
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::InMemory,
            database_url: None,
            max_connections: 10,
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            storage_type: StorageType::Postgres,
            database_url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Builds repositories for the configured backend
///
/// For Postgres one pool is opened and shared by every repository it hands out.
#[derive(Debug, Clone)]
pub struct StorageFactory {
    pool: Option<PgPool>,
}

impl StorageFactory {
    pub async fn connect(config: &StorageConfig) -> Result<Self, DomainError> {
        let pool = match config.storage_type {
            StorageType::InMemory => None,
            StorageType::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("database_url is required for postgres storage")
                })?;

                info!(max_connections = config.max_connections, "Connecting to PostgreSQL");
                Some(connect_pool(url, config.max_connections).await?)
            }
        };

        Ok(Self { pool })
    }

    pub fn in_memory() -> Self {
        Self { pool: None }
    }

    pub fn storage_type(&self) -> StorageType {
        match self.pool {
            Some(_) => StorageType::Postgres,
            None => StorageType::InMemory,
        }
    }

    /// Document storage for `E`, creating its table if needed
    pub async fn entity_storage<E>(&self, table_name: &str) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        match &self.pool {
            None => Ok(Arc::new(InMemoryStorage::<E>::new())),
            Some(pool) => {
                let storage = PostgresStorage::<E>::new(pool.clone(), table_name);
                storage.ensure_table().await?;
                Ok(Arc::new(storage))
            }
        }
    }

    /// API key repository, creating its table if needed
    pub async fn api_key_repository(&self) -> Result<Arc<dyn ApiKeyRepository>, DomainError> {
        match &self.pool {
            None => Ok(Arc::new(InMemoryApiKeyRepository::new())),
            Some(pool) => {
                let repository = PostgresApiKeyRepository::new(pool.clone());
                repository.ensure_table().await?;
                Ok(Arc::new(repository))
            }
        }
    }
}
