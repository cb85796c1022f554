//! Application state for shared services

use std::sync::Arc;

use crate::domain::Cache;
use crate::infrastructure::api_key::{ApiKeyStore, Authorizer};
use crate::infrastructure::project::ProjectService;
use crate::infrastructure::rate_limiter::RateLimiter;
use crate::infrastructure::testimonial::TestimonialService;

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
    pub projects: Arc<ProjectService>,
    pub testimonials: Arc<TestimonialService>,
    pub testaments: Arc<TestimonialService>,
    pub cache: Arc<dyn Cache>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        authorizer: Arc<Authorizer>,
        projects: Arc<ProjectService>,
        testimonials: Arc<TestimonialService>,
        testaments: Arc<TestimonialService>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            authorizer,
            projects,
            testimonials,
            testaments,
            cache,
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn key_store(&self) -> &Arc<ApiKeyStore> {
        self.authorizer.store()
    }
}
