//! Router assembly

use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::middleware::{
    global_rate_limit, limited, logging_middleware, metrics_middleware,
    security_headers_middleware,
};
use super::state::AppState;
use super::types::ApiError;
use super::testimonials::{create_testimonials_router, Testaments, Testimonials};
use super::{auth, health, projects};
use crate::config::CorsConfig;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};
use crate::infrastructure::rate_limiter::RateLimit;

/// Build the full application router
pub fn create_router(
    state: AppState,
    cors: &CorsConfig,
    metrics: Option<PrometheusMetrics>,
) -> Router {
    let limiter = state.rate_limiter.clone();

    let mut router = Router::new()
        .route(
            "/ping",
            limited(get(health::ping), &limiter, "ping", RateLimit::per_minutes(10, 5)),
        )
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/ready", get(health::ready_check))
        .nest("/auth", auth::create_auth_router(&state))
        .nest("/projects", projects::create_projects_router(&state))
        .nest("/testimonials", create_testimonials_router::<Testimonials>(&state))
        .nest("/testaments", create_testimonials_router::<Testaments>(&state))
        .fallback(not_found)
        .with_state(state);

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
        .layer(middleware::from_fn_with_state(limiter, global_rate_limit))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {} {}", method, uri.path()))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
