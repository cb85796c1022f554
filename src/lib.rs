//! Portfolio backend
//!
//! Serves portfolio projects behind API-key authorization:
//! - API keys with a closed permission vocabulary, expiry and revocation
//! - A master key guarding key administration
//! - Cached project listings over in-memory or PostgreSQL storage
//! - Testimonials and testaments submitted with one-time keys

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{Project, Testimonial, TestimonialKind};
use infrastructure::{
    api_key::{ApiKeyStore, Authorizer},
    cache::CacheFactory,
    project::{ProjectService, PROJECTS_TABLE},
    storage::StorageFactory,
    testimonial::TestimonialService,
};
use tracing::info;

/// Create the application state from configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = CacheFactory::new().create(&config.cache).await?;
    info!(cache_type = %config.cache.cache_type, "Cache initialized");

    let storage = StorageFactory::connect(&config.storage).await?;
    info!(storage_type = %storage.storage_type(), "Storage initialized");

    let key_store = ApiKeyStore::new(storage.api_key_repository().await?, cache.clone())
        .with_cache_ttl(Duration::from_secs(config.auth.cache_ttl_secs));
    let authorizer = Authorizer::new(Arc::new(key_store), config.auth.master_key.clone());

    let list_ttl = Duration::from_secs(config.cache.default_ttl_secs);

    let projects = ProjectService::new(
        storage.entity_storage::<Project>(PROJECTS_TABLE).await?,
        cache.clone(),
    )
    .with_list_ttl(list_ttl);

    let testimonials = TestimonialService::new(
        TestimonialKind::Testimonial,
        storage
            .entity_storage::<Testimonial>(TestimonialKind::Testimonial.as_str())
            .await?,
        cache.clone(),
    )
    .with_list_ttl(list_ttl);

    let testaments = TestimonialService::new(
        TestimonialKind::Testament,
        storage
            .entity_storage::<Testimonial>(TestimonialKind::Testament.as_str())
            .await?,
        cache.clone(),
    )
    .with_list_ttl(list_ttl);

    Ok(AppState::new(
        Arc::new(authorizer),
        Arc::new(projects),
        Arc::new(testimonials),
        Arc::new(testaments),
        cache,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api_key::NewApiKey;

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let mut config = AppConfig::default();
        config.auth.master_key = "master".to_string();

        let state = create_app_state_with_config(&config).await.unwrap();

        let key = state.key_store().create(NewApiKey::default()).await.unwrap();
        assert!(state.authorizer.verify(key.secret(), &[]).await.is_ok());
        assert!(state.authorizer.require_master_key(Some("Bearer master")).is_ok());
        assert!(state.projects.check_storage().await.is_ok());
        assert_eq!(state.testimonials.kind(), TestimonialKind::Testimonial);
        assert_eq!(state.testaments.kind(), TestimonialKind::Testament);
    }
}
