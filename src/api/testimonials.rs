//! Testimonial and testament endpoints
//!
//! Both collections expose the same routes. Submitting needs only a
//! one-time key; issuing keys, listing and deleting need API key permissions.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};

use crate::api::middleware::{
    limited, CanDeleteTestaments, CanDeleteTestimonials, CanReadTestaments, CanReadTestimonials,
    CanWriteTestaments, CanWriteTestimonials, PermissionScope, RequirePermission,
};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Data, Json, Query};
use crate::domain::testimonial::{Testimonial, TestimonialId, TestimonialListQuery};
use crate::infrastructure::rate_limiter::RateLimit;
use crate::infrastructure::testimonial::{CreateTestimonialRequest, TestimonialService};

/// A testimonial collection mounted under its own prefix
pub trait Collection: Send + Sync + 'static {
    type Read: PermissionScope;
    type Write: PermissionScope;
    type Delete: PermissionScope;

    const CREATE_BUCKET: &'static str;
    const KEY_BUCKET: &'static str;
    const LIST_BUCKET: &'static str;
    const DELETE_BUCKET: &'static str;

    fn service(state: &AppState) -> &Arc<TestimonialService>;
}

pub struct Testimonials;

impl Collection for Testimonials {
    type Read = CanReadTestimonials;
    type Write = CanWriteTestimonials;
    type Delete = CanDeleteTestimonials;

    const CREATE_BUCKET: &'static str = "testimonials.create";
    const KEY_BUCKET: &'static str = "testimonials.key";
    const LIST_BUCKET: &'static str = "testimonials.list";
    const DELETE_BUCKET: &'static str = "testimonials.delete";

    fn service(state: &AppState) -> &Arc<TestimonialService> {
        &state.testimonials
    }
}

pub struct Testaments;

impl Collection for Testaments {
    type Read = CanReadTestaments;
    type Write = CanWriteTestaments;
    type Delete = CanDeleteTestaments;

    const CREATE_BUCKET: &'static str = "testaments.create";
    const KEY_BUCKET: &'static str = "testaments.key";
    const LIST_BUCKET: &'static str = "testaments.list";
    const DELETE_BUCKET: &'static str = "testaments.delete";

    fn service(state: &AppState) -> &Arc<TestimonialService> {
        &state.testaments
    }
}

pub fn create_testimonials_router<C: Collection>(state: &AppState) -> Router<AppState> {
    let limiter = &state.rate_limiter;

    Router::new()
        .route(
            "/",
            limited(get(list::<C>), limiter, C::LIST_BUCKET, RateLimit::per_minutes(300, 5)),
        )
        .route(
            "/create",
            limited(post(create::<C>), limiter, C::CREATE_BUCKET, RateLimit::per_minutes(10, 5)),
        )
        .route(
            "/key/generate",
            limited(
                get(generate_key::<C>),
                limiter,
                C::KEY_BUCKET,
                RateLimit::per_minutes(20, 5),
            ),
        )
        .route(
            "/delete/{id}",
            limited(
                delete(remove::<C>),
                limiter,
                C::DELETE_BUCKET,
                RateLimit::per_minutes(20, 5),
            ),
        )
}

/// POST /{collection}/create
async fn create<C: Collection>(
    State(state): State<AppState>,
    Json(request): Json<CreateTestimonialRequest>,
) -> Result<(StatusCode, Data<Testimonial>), ApiError> {
    let testimonial = C::service(&state).create(request).await?;

    Ok((StatusCode::CREATED, Data::new(testimonial)))
}

/// GET /{collection}/key/generate
async fn generate_key<C: Collection>(
    _guard: RequirePermission<C::Write>,
    State(state): State<AppState>,
) -> Result<Data<String>, ApiError> {
    let key = C::service(&state).generate_key().await?;

    Ok(Data::new(key))
}

/// GET /{collection}
async fn list<C: Collection>(
    _guard: RequirePermission<C::Read>,
    State(state): State<AppState>,
    Query(query): Query<TestimonialListQuery>,
) -> Result<Data<Vec<Testimonial>>, ApiError> {
    let testimonials = C::service(&state).list(&query).await?;

    Ok(Data::new(testimonials))
}

/// DELETE /{collection}/delete/{id}
async fn remove<C: Collection>(
    _guard: RequirePermission<C::Delete>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Data<Testimonial>, ApiError> {
    let service = C::service(&state);
    let id: TestimonialId = id.parse().map_err(|_| {
        ApiError::bad_request(format!("Invalid {} id", service.kind().label().to_lowercase()))
            .with_param("id")
    })?;

    let testimonial = service.delete(&id).await?;

    Ok(Data::new(testimonial))
}
