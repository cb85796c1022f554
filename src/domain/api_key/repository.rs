//! API key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKeyId, ApiKeyRecord};
use crate::domain::DomainError;

/// Repository trait for API key persistence
///
/// Implementations must enforce secret uniqueness and report a duplicate
/// secret on `create` as `DomainError::Conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Get an API key by its ID
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Get an API key by its secret
    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Persist a new API key
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// Update an existing API key
    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    /// Check whether a secret is already taken
    async fn secret_exists(&self, secret: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_secret(secret).await?.is_some())
    }
}
