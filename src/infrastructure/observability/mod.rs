//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_auth_decision, record_http_request, AuthOutcome,
    MetricsConfig, PrometheusMetrics,
};
