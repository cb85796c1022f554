//! Testimonial service
//!
//! Visitors submit a testimonial with a one-time key handed out by an
//! authorized caller. A key is consumed by the first submission that
//! presents it.

use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::cache::{reference_key, Cache, CacheExt, PayloadKey};
use crate::domain::storage::Storage;
use crate::domain::testimonial::{
    Testimonial, TestimonialId, TestimonialKind, TestimonialListQuery,
};
use crate::domain::DomainError;
use crate::infrastructure::validation::validation_error;

pub const SUBMISSION_KEY_LENGTH: usize = 6;

/// How long an unused submission key stays valid
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetime of a cached listing
pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTestimonialRequest {
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Bio cannot be empty"))]
    pub bio: Option<String>,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: String,
    #[validate(length(equal = 6, message = "Key must be 6 characters"))]
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct TestimonialService {
    kind: TestimonialKind,
    storage: Arc<dyn Storage<Testimonial>>,
    cache: Arc<dyn Cache>,
    list_ttl: Duration,
    key_ttl: Duration,
}

impl TestimonialService {
    pub fn new(
        kind: TestimonialKind,
        storage: Arc<dyn Storage<Testimonial>>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            kind,
            storage,
            cache,
            list_ttl: DEFAULT_LIST_TTL,
            key_ttl: DEFAULT_KEY_TTL,
        }
    }

    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    pub fn kind(&self) -> TestimonialKind {
        self.kind
    }

    /// Issue a mixed-case alphanumeric key good for one submission
    pub async fn generate_key(&self) -> Result<String, DomainError> {
        let key: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUBMISSION_KEY_LENGTH)
            .map(char::from)
            .collect();

        self.cache.set(&self.key_cache_key(&key), &key, self.key_ttl).await?;
        debug!(kind = %self.kind, "Submission key issued");

        Ok(key)
    }

    pub async fn create(&self, request: CreateTestimonialRequest) -> Result<Testimonial, DomainError> {
        request.validate().map_err(validation_error)?;

        // Deleting is the check, so two submissions cannot share a key
        if !self.cache.delete(&self.key_cache_key(&request.key)).await? {
            return Err(DomainError::unauthorized("Invalid key"));
        }

        let testimonial = Testimonial::new(request.author, request.content).with_bio(request.bio);
        let created = self.storage.create(testimonial).await?;
        info!(kind = %self.kind, id = %created.id(), author = %created.author(), "Testimonial created");

        self.invalidate_listings().await;
        Ok(created)
    }

    pub async fn list(&self, query: &TestimonialListQuery) -> Result<Vec<Testimonial>, DomainError> {
        let key = query.cache_key(self.kind);

        if query.revalidate() {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(kind = %self.kind, error = %e, "Failed to drop cached listing");
            }
        } else {
            match self.cache.get::<Vec<Testimonial>>(&key).await {
                Ok(Some(testimonials)) => return Ok(testimonials),
                Ok(None) => {}
                Err(e) => warn!(kind = %self.kind, error = %e, "Listing cache read failed"),
            }
        }

        let testimonials = query.apply(self.storage.list().await?);

        if let Err(e) = self.cache.set(&key, &testimonials, self.list_ttl).await {
            warn!(kind = %self.kind, error = %e, "Failed to cache listing");
        }

        Ok(testimonials)
    }

    pub async fn delete(&self, id: &TestimonialId) -> Result<Testimonial, DomainError> {
        let not_found = || DomainError::not_found(format!("{} not found", self.kind.label()));

        let testimonial = self.storage.get(id).await?.ok_or_else(not_found)?;

        if !self.storage.delete(id).await? {
            return Err(not_found());
        }
        info!(kind = %self.kind, id = %id, "Testimonial deleted");

        self.invalidate_listings().await;
        Ok(testimonial)
    }

    fn key_cache_key(&self, key: &str) -> String {
        reference_key(self.kind.key_namespace(), "generator", key)
    }

    async fn invalidate_listings(&self) {
        let pattern = PayloadKey::namespace_pattern(self.kind.cache_namespace());

        match self.cache.delete_pattern(&pattern).await {
            Ok(count) => debug!(kind = %self.kind, count, "Dropped cached listings"),
            Err(e) => warn!(kind = %self.kind, error = %e, "Failed to drop cached listings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::infrastructure::storage::InMemoryStorage;

    fn service(kind: TestimonialKind) -> (TestimonialService, Arc<InMemoryStorage<Testimonial>>, Arc<MockCache>) {
        let storage = Arc::new(InMemoryStorage::new());
        let cache = Arc::new(MockCache::new());
        let service = TestimonialService::new(kind, storage.clone(), cache.clone());
        (service, storage, cache)
    }

    fn request(key: &str) -> CreateTestimonialRequest {
        CreateTestimonialRequest {
            author: "Ada".to_string(),
            bio: None,
            content: "Great to work with on every release".to_string(),
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_generated_key_shape_and_ttl() {
        let (service, _, cache) = service(TestimonialKind::Testimonial);

        let key = service.generate_key().await.unwrap();

        assert_eq!(key.len(), SUBMISSION_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));

        let cache_key = format!("TestimonialKey[ref:generator]:{}", key);
        assert!(cache.raw_entry(&cache_key).is_some());
        assert_eq!(cache.ttl_of(&cache_key), Some(DEFAULT_KEY_TTL));
    }

    #[tokio::test]
    async fn test_key_is_consumed_by_create() {
        let (service, _, cache) = service(TestimonialKind::Testament);
        let key = service.generate_key().await.unwrap();

        let created = service.create(request(&key)).await.unwrap();

        assert_eq!(created.author(), "Ada");
        assert!(cache
            .raw_entry(&format!("TestamentKey[ref:generator]:{}", key))
            .is_none());

        let err = service.create(request(&key)).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized { .. }));
        assert_eq!(err.to_string(), "Unauthorized: Invalid key");
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let (service, storage, _) = service(TestimonialKind::Testimonial);

        let err = service.create(request("abcDEF")).await.unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized { .. }));
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keys_do_not_cross_kinds() {
        let (testimonials, _, cache) = service(TestimonialKind::Testimonial);
        let testaments = TestimonialService::new(
            TestimonialKind::Testament,
            Arc::new(InMemoryStorage::<Testimonial>::new()),
            cache.clone(),
        );

        let key = testimonials.generate_key().await.unwrap();

        assert!(testaments.create(request(&key)).await.is_err());
        assert!(testimonials.create(request(&key)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_validates_before_consuming_key() {
        let (service, _, _) = service(TestimonialKind::Testimonial);
        let key = service.generate_key().await.unwrap();

        let mut short = request(&key);
        short.content = "too short".to_string();
        let err = service.create(short).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(err.to_string().contains("content"));

        let mut empty_bio = request(&key);
        empty_bio.bio = Some(String::new());
        assert!(matches!(
            service.create(empty_bio).await,
            Err(DomainError::Validation { .. })
        ));

        assert!(service.create(request(&key)).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_cache_invalidated_on_create_and_delete() {
        let (service, storage, cache) = service(TestimonialKind::Testimonial);
        let query = TestimonialListQuery::default();
        let cache_key = query.cache_key(TestimonialKind::Testimonial);

        assert!(service.list(&query).await.unwrap().is_empty());
        assert_eq!(cache.ttl_of(&cache_key), Some(DEFAULT_LIST_TTL));

        // Written behind the service's back, so the cached listing hides it
        storage
            .create(Testimonial::new("Hidden", "Stored without the service"))
            .await
            .unwrap();
        assert!(service.list(&query).await.unwrap().is_empty());

        let key = service.generate_key().await.unwrap();
        let created = service.create(request(&key)).await.unwrap();
        assert!(cache.raw_entry(&cache_key).is_none());
        assert_eq!(service.list(&query).await.unwrap().len(), 2);

        service.delete(created.id()).await.unwrap();
        assert!(cache.raw_entry(&cache_key).is_none());
        assert_eq!(service.list(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revalidate_bypasses_cache() {
        let (service, storage, _) = service(TestimonialKind::Testament);
        let query = TestimonialListQuery::default();
        service.list(&query).await.unwrap();

        storage
            .create(Testimonial::new("Grace", "Stored without the service"))
            .await
            .unwrap();

        let revalidate = TestimonialListQuery {
            revalidate: Some(true),
            ..Default::default()
        };
        assert_eq!(service.list(&revalidate).await.unwrap().len(), 1);
        assert_eq!(service.list(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (service, _, _) = service(TestimonialKind::Testament);

        let err = service.delete(&TestimonialId::generate()).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.to_string(), "Not found: Testament not found");
    }
}
