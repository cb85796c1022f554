//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod cache;
pub mod logging;
pub mod observability;
pub mod project;
pub mod rate_limiter;
pub mod storage;
pub mod testimonial;
pub mod validation;
