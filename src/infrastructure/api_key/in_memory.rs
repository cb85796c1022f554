//! In-memory API key repository implementation

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKeyId, ApiKeyRecord, ApiKeyRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<ApiKeyId, ApiKeyRecord>,
    /// secret -> id
    secret_index: HashMap<String, ApiKeyId>,
}

/// In-memory implementation of ApiKeyRepository
///
/// Both maps live behind one lock so the secret uniqueness check and the
/// insert happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    tables: RwLock<Tables>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.records.len()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        Ok(self.tables.read().await.records.get(id).cloned())
    }

    async fn get_by_secret(&self, secret: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .secret_index
            .get(secret)
            .and_then(|id| tables.records.get(id))
            .cloned())
    }

    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.records.contains_key(record.id()) {
            return Err(DomainError::conflict(format!(
                "API key with ID '{}' already exists",
                record.id()
            )));
        }

        if tables.secret_index.contains_key(record.secret()) {
            return Err(DomainError::conflict("API key secret already exists"));
        }

        tables
            .secret_index
            .insert(record.secret().to_string(), *record.id());
        tables.records.insert(*record.id(), record.clone());

        Ok(record)
    }

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.records.get_mut(record.id()) {
            Some(existing) if existing.secret() == record.secret() => {
                *existing = record.clone();
                Ok(record.clone())
            }
            Some(_) => Err(DomainError::validation("API key secret cannot change")),
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                record.id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{Permission, PermissionSet};

    const SECRET: &str = "sk-0123456789abcdef0123456789abc";

    fn record(secret: &str) -> ApiKeyRecord {
        ApiKeyRecord::new(secret, PermissionSet::from_iter([Permission::FilesRead]))
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(record(SECRET)).await.unwrap();

        let by_id = repo.get(created.id()).await.unwrap();
        let by_secret = repo.get_by_secret(SECRET).await.unwrap();

        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_secret, Some(created));
        assert!(repo.secret_exists(SECRET).await.unwrap());
        assert!(!repo.secret_exists("sk-fffffffffffffffffffffffffffff").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_secret_is_conflict() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(record(SECRET)).await.unwrap();

        let result = repo.create(record(SECRET)).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_persists_revocation() {
        let repo = InMemoryApiKeyRepository::new();
        let mut created = repo.create(record(SECRET)).await.unwrap();

        assert!(created.revoke());
        repo.update(&created).await.unwrap();

        let stored = repo.get_by_secret(SECRET).await.unwrap().unwrap();
        assert!(stored.is_revoked());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryApiKeyRepository::new();

        let result = repo.update(&record(SECRET)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
