//! API middleware components

pub mod auth;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod security;

pub use auth::{
    CanDeleteProjects, CanDeleteTestaments, CanDeleteTestimonials, CanReadProjects,
    CanReadTestaments, CanReadTestimonials, CanWriteProjects, CanWriteTestaments,
    CanWriteTestimonials, PermissionScope, RequireMasterKey, RequirePermission,
};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use rate_limit::{global_rate_limit, limited, route_rate_limit, RouteLimit, GLOBAL_LIMIT};
pub use security::security_headers_middleware;
