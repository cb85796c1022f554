//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Deserialize;
use uuid::Uuid;

/// `[metrics]` configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
///
/// Returns `None` when disabled or when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("portfolio_backend_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at /metrics");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Outcome of an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Allowed,
    InvalidKey,
    Revoked,
    Expired,
    MissingPermission,
    MasterKeyAllowed,
    MasterKeyDenied,
}

impl AuthOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Allowed => "allowed",
            AuthOutcome::InvalidKey => "invalid_key",
            AuthOutcome::Revoked => "revoked",
            AuthOutcome::Expired => "expired",
            AuthOutcome::MissingPermission => "missing_permission",
            AuthOutcome::MasterKeyAllowed => "master_key_allowed",
            AuthOutcome::MasterKeyDenied => "master_key_denied",
        }
    }
}

pub fn record_auth_decision(outcome: AuthOutcome) {
    counter!("auth_decisions_total", "outcome" => outcome.as_str()).increment(1);
}

/// Collapse identifiers and secrets so unmatched paths keep label cardinality low
fn sanitize_path(path: &str) -> String {
    let sanitized = path
        .split('/')
        .map(|segment| {
            let is_id = Uuid::parse_str(segment).is_ok()
                || (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
                || segment.starts_with("sk-");

            if is_id {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    match sanitized.char_indices().nth(50) {
        Some((idx, _)) => sanitized[..idx].to_string(),
        None => sanitized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/projects/delete/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/projects/delete/{id}");
    }

    #[test]
    fn test_sanitize_path_secret() {
        assert_eq!(
            sanitize_path("/auth/sk-0123456789abcdef0123456789abc"),
            "/auth/{id}"
        );
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/api/users/123/orders"), "/api/users/{id}/orders");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_auth_outcome_labels() {
        assert_eq!(AuthOutcome::Allowed.as_str(), "allowed");
        assert_eq!(AuthOutcome::MissingPermission.as_str(), "missing_permission");
    }
}
