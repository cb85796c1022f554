//! Project service
//!
//! CRUD over the project storage with memoized list queries. Every
//! mutation drops all cached listings.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError};

use crate::domain::cache::{Cache, CacheExt, PayloadKey};
use crate::domain::project::{
    Project, ProjectChanges, ProjectId, ProjectListQuery, PROJECTS_CACHE_NAMESPACE,
};
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::validation::validation_error;

/// Table backing project storage in Postgres
pub const PROJECTS_TABLE: &str = "projects";

/// Lifetime of a cached listing
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(300);

fn http_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("http_url").with_message("must be an http(s) URL".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url, custom(function = "http_url"))]
    pub repository_url: String,
    #[validate(url, custom(function = "http_url"))]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub id: ProjectId,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(url, custom(function = "http_url"))]
    pub repository_url: Option<String>,
    #[validate(url, custom(function = "http_url"))]
    pub preview_url: Option<String>,
    pub topics: Option<Vec<String>>,
}

impl UpdateProjectRequest {
    fn into_changes(self) -> (ProjectId, ProjectChanges) {
        (
            self.id,
            ProjectChanges {
                name: self.name,
                description: self.description,
                repository_url: self.repository_url,
                preview_url: self.preview_url,
                topics: self.topics,
            },
        )
    }
}

#[derive(Debug, Clone)]
pub struct ProjectService {
    storage: Arc<dyn Storage<Project>>,
    cache: Arc<dyn Cache>,
    list_ttl: Duration,
}

impl ProjectService {
    pub fn new(storage: Arc<dyn Storage<Project>>, cache: Arc<dyn Cache>) -> Self {
        Self {
            storage,
            cache,
            list_ttl: DEFAULT_LIST_TTL,
        }
    }

    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    /// Round-trip to the backing storage
    pub async fn check_storage(&self) -> Result<(), DomainError> {
        self.storage.count().await.map(|_| ())
    }

    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project, DomainError> {
        request.validate().map_err(validation_error)?;
        self.ensure_name_available(&request.name, None).await?;

        let project = Project::new(request.name, request.repository_url)
            .with_description(request.description)
            .with_preview_url(request.preview_url)
            .with_topics(request.topics);

        let created = self.storage.create(project).await?;
        info!(project_id = %created.id(), name = %created.name(), "Project created");

        self.invalidate_listings().await;
        Ok(created)
    }

    /// List projects matching `query`, served from cache when possible
    pub async fn list(&self, query: &ProjectListQuery) -> Result<Vec<Project>, DomainError> {
        let key = query.cache_key();

        if query.revalidate() {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(error = %e, "Failed to drop cached project listing");
            }
        } else {
            match self.cache.get::<Vec<Project>>(&key).await {
                Ok(Some(projects)) => {
                    debug!(count = projects.len(), "Project listing served from cache");
                    return Ok(projects);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Project cache read failed"),
            }
        }

        let projects = query.apply(self.storage.list().await?);

        if let Err(e) = self.cache.set(&key, &projects, self.list_ttl).await {
            warn!(error = %e, "Failed to cache project listing");
        }

        Ok(projects)
    }

    pub async fn update(&self, request: UpdateProjectRequest) -> Result<Project, DomainError> {
        request.validate().map_err(validation_error)?;
        let (id, changes) = request.into_changes();

        let mut project = self.get(&id).await?;

        if let Some(name) = changes.name.as_deref() {
            if name != project.name() {
                self.ensure_name_available(name, Some(&id)).await?;
            }
        }

        project.apply(changes);
        let updated = self.storage.update(project).await?;
        info!(project_id = %id, "Project updated");

        self.invalidate_listings().await;
        Ok(updated)
    }

    /// Delete a project, returning what was removed
    pub async fn delete(&self, id: &ProjectId) -> Result<Project, DomainError> {
        let project = self.get(id).await?;

        if !self.storage.delete(id).await? {
            return Err(DomainError::not_found("Project not found"));
        }
        info!(project_id = %id, "Project deleted");

        self.invalidate_listings().await;
        Ok(project)
    }

    async fn get(&self, id: &ProjectId) -> Result<Project, DomainError> {
        self.storage
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project not found"))
    }

    async fn ensure_name_available(
        &self,
        name: &str,
        except: Option<&ProjectId>,
    ) -> Result<(), DomainError> {
        let taken = self
            .storage
            .list()
            .await?
            .iter()
            .any(|p| p.name() == name && Some(p.id()) != except);

        if taken {
            return Err(DomainError::conflict("Project already exists"));
        }

        Ok(())
    }

    async fn invalidate_listings(&self) {
        let pattern = PayloadKey::namespace_pattern(PROJECTS_CACHE_NAMESPACE);

        match self.cache.delete_pattern(&pattern).await {
            Ok(count) => debug!(count, "Dropped cached project listings"),
            Err(e) => warn!(error = %e, "Failed to drop cached project listings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::infrastructure::storage::InMemoryStorage;

    fn service() -> (ProjectService, Arc<InMemoryStorage<Project>>, Arc<MockCache>) {
        let storage = Arc::new(InMemoryStorage::new());
        let cache = Arc::new(MockCache::new());
        let service = ProjectService::new(storage.clone(), cache.clone());
        (service, storage, cache)
    }

    fn create_request(name: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: name.to_string(),
            description: None,
            repository_url: format!("https://github.com/me/{}", name),
            preview_url: None,
            topics: vec!["rust".to_string()],
        }
    }

    fn update_request(id: ProjectId) -> UpdateProjectRequest {
        UpdateProjectRequest {
            id,
            name: None,
            description: None,
            repository_url: None,
            preview_url: None,
            topics: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let (service, _, _) = service();
        service.create(create_request("alpha")).await.unwrap();

        let result = service.create(create_request("alpha")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let (service, _, _) = service();

        let mut request = create_request("alpha");
        request.name = String::new();
        assert!(matches!(
            service.create(request).await,
            Err(DomainError::Validation { .. })
        ));

        let mut request = create_request("alpha");
        request.repository_url = "ftp://example.com/repo".to_string();
        assert!(matches!(
            service.create(request).await,
            Err(DomainError::Validation { .. })
        ));

        let mut request = create_request("alpha");
        request.preview_url = Some("not a url".to_string());
        assert!(matches!(
            service.create(request).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_is_cached_until_mutation() {
        let (service, storage, cache) = service();
        service.create(create_request("alpha")).await.unwrap();

        let query = ProjectListQuery::default();
        assert_eq!(service.list(&query).await.unwrap().len(), 1);
        assert_eq!(cache.ttl_of(&query.cache_key()), Some(DEFAULT_LIST_TTL));

        // Written behind the service's back, so only a fresh read sees it
        storage
            .create(Project::new("hidden", "https://github.com/me/hidden"))
            .await
            .unwrap();
        assert_eq!(service.list(&query).await.unwrap().len(), 1);

        service.create(create_request("beta")).await.unwrap();
        assert!(cache.raw_entry(&query.cache_key()).is_none());
        assert_eq!(service.list(&query).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_revalidate_bypasses_cache() {
        let (service, storage, _) = service();
        let query = ProjectListQuery::default();
        assert!(service.list(&query).await.unwrap().is_empty());

        storage
            .create(Project::new("alpha", "https://github.com/me/alpha"))
            .await
            .unwrap();

        let revalidate = ProjectListQuery {
            revalidate: Some(true),
            ..Default::default()
        };
        assert_eq!(service.list(&revalidate).await.unwrap().len(), 1);
        assert_eq!(service.list(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_survives_cache_failure() {
        let storage = Arc::new(InMemoryStorage::new());
        let service = ProjectService::new(storage, Arc::new(MockCache::new().with_error("down")));

        service.create(create_request("alpha")).await.unwrap();

        assert_eq!(
            service.list(&ProjectListQuery::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_applies_changes() {
        let (service, _, _) = service();
        let created = service.create(create_request("alpha")).await.unwrap();

        let mut request = update_request(*created.id());
        request.name = Some("renamed".to_string());
        request.preview_url = Some("https://alpha.example.com".to_string());

        let updated = service.update(request).await.unwrap();

        assert_eq!(updated.name(), "renamed");
        assert_eq!(updated.preview_url(), Some("https://alpha.example.com"));
        assert_eq!(updated.topics(), created.topics());
        assert!(updated.updated_at() >= created.updated_at());
    }

    #[tokio::test]
    async fn test_update_name_clash_and_missing() {
        let (service, _, _) = service();
        service.create(create_request("alpha")).await.unwrap();
        let beta = service.create(create_request("beta")).await.unwrap();

        let mut clash = update_request(*beta.id());
        clash.name = Some("alpha".to_string());
        assert!(matches!(
            service.update(clash).await,
            Err(DomainError::Conflict { .. })
        ));

        let mut same = update_request(*beta.id());
        same.name = Some("beta".to_string());
        assert!(service.update(same).await.is_ok());

        assert!(matches!(
            service.update(update_request(ProjectId::generate())).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_project_and_invalidates() {
        let (service, _, cache) = service();
        let created = service.create(create_request("alpha")).await.unwrap();
        let query = ProjectListQuery::default();
        service.list(&query).await.unwrap();

        let deleted = service.delete(created.id()).await.unwrap();

        assert_eq!(deleted.id(), created.id());
        assert!(cache.raw_entry(&query.cache_key()).is_none());
        assert!(service.list(&query).await.unwrap().is_empty());
        assert!(matches!(
            service.delete(created.id()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_validation_error_message() {
        let mut request = create_request("alpha");
        request.name = String::new();

        let error = validation_error(request.validate().unwrap_err());

        assert_eq!(error.to_string(), "Validation error: name: Name is required");

        let mut request = create_request("alpha");
        request.repository_url = "ftp://example.com/repo".to_string();

        let error = validation_error(request.validate().unwrap_err());

        assert!(error.to_string().starts_with("Validation error: repositoryUrl: "));
    }
}
