//! Per-client rate limiting

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::rate_limiter::{RateLimit, RateLimiter};

/// Applied to every request on top of any route limit
pub const GLOBAL_LIMIT: RateLimit = RateLimit::per_minutes(50, 1);

const ANONYMOUS_CLIENT: &str = "anonymous";

/// A named limit bound to the shared limiter
#[derive(Debug, Clone)]
pub struct RouteLimit {
    limiter: Arc<RateLimiter>,
    name: &'static str,
    limit: RateLimit,
}

impl RouteLimit {
    pub fn new(limiter: Arc<RateLimiter>, name: &'static str, limit: RateLimit) -> Self {
        Self {
            limiter,
            name,
            limit,
        }
    }

    async fn check(&self, client: &str) -> Result<(u32, u32), ApiError> {
        let bucket = format!("{}:{}", self.name, client);
        let result = self.limiter.check_and_record(&bucket, self.limit).await;

        if !result.allowed {
            warn!(route = self.name, client = %client, "Rate limit exceeded");
            return Err(ApiError::rate_limited(result.reset_in_seconds));
        }

        Ok((result.limit, result.remaining))
    }
}

/// Wrap a route with its own limit
pub fn limited(
    route: MethodRouter<AppState>,
    limiter: &Arc<RateLimiter>,
    name: &'static str,
    limit: RateLimit,
) -> MethodRouter<AppState> {
    route.layer(middleware::from_fn_with_state(
        RouteLimit::new(limiter.clone(), name, limit),
        route_rate_limit,
    ))
}

pub async fn route_rate_limit(
    State(route): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_id(request.headers());
    let (limit, remaining) = route.check(&client).await?;

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));

    Ok(response)
}

pub async fn global_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_id(request.headers());

    RouteLimit::new(limiter, "global", GLOBAL_LIMIT)
        .check(&client)
        .await?;

    Ok(next.run(request).await)
}

/// `x-forwarded-for` (first hop), then `x-real-ip`, else anonymous
pub fn client_id(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}
