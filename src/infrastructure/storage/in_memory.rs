//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }
}

fn read_lock_error<T>(e: T) -> DomainError
where
    T: std::fmt::Display,
{
    DomainError::storage(format!("Failed to acquire read lock: {}", e))
}

fn write_lock_error<T>(e: T) -> DomainError
where
    T: std::fmt::Display,
{
    DomainError::storage(format!("Failed to acquire write lock: {}", e))
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let entities = self.entities.read().map_err(read_lock_error)?;

        Ok(entities.get(&key.storage_key()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(read_lock_error)?;

        Ok(entities.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().storage_key();
        let mut entities = self.entities.write().map_err(write_lock_error)?;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().storage_key();
        let mut entities = self.entities.write().map_err(write_lock_error)?;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let mut entities = self.entities.write().map_err(write_lock_error)?;

        Ok(entities.remove(&key.storage_key()).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let entities = self.entities.read().map_err(read_lock_error)?;

        Ok(entities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::{Project, ProjectChanges, ProjectId};

    fn project(name: &str) -> Project {
        Project::new(name, format!("https://github.com/me/{}", name))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();
        let p = project("alpha");

        storage.create(p.clone()).await.unwrap();

        let result = storage.get(p.id()).await.unwrap();
        assert_eq!(result, Some(p));
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();
        let p = project("alpha");

        storage.create(p.clone()).await.unwrap();
        let result = storage.create(p).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();
        let mut p = project("alpha");
        storage.create(p.clone()).await.unwrap();

        p.apply(ProjectChanges {
            name: Some("renamed".to_string()),
            ..Default::default()
        });
        storage.update(p.clone()).await.unwrap();

        let result = storage.get(p.id()).await.unwrap().unwrap();
        assert_eq!(result.name(), "renamed");
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();

        let result = storage.update(project("alpha")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();
        let p = project("alpha");
        storage.create(p.clone()).await.unwrap();

        assert!(storage.delete(p.id()).await.unwrap());
        assert!(!storage.exists(p.id()).await.unwrap());
        assert!(!storage.delete(&ProjectId::generate()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let storage: InMemoryStorage<Project> = InMemoryStorage::new();

        storage.create(project("a")).await.unwrap();
        storage.create(project("b")).await.unwrap();
        storage.create(project("c")).await.unwrap();

        assert_eq!(storage.list().await.unwrap().len(), 3);
        assert_eq!(storage.count().await.unwrap(), 3);
    }
}
