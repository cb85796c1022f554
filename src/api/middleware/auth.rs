//! Bearer-token guards for master key and API key routes

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{ApiKeyRecord, Permission};
use crate::infrastructure::api_key;

/// Permissions a route demands from the presented API key
pub trait PermissionScope: Send + Sync + 'static {
    const REQUIRED: &'static [Permission];
}

macro_rules! permission_scope {
    ($($name:ident => $permission:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl PermissionScope for $name {
                const REQUIRED: &'static [Permission] = &[Permission::$permission];
            }
        )+
    };
}

permission_scope! {
    CanReadProjects => ProjectsRead,
    CanWriteProjects => ProjectsWrite,
    CanDeleteProjects => ProjectsDelete,
    CanReadTestimonials => TestimonialsRead,
    CanWriteTestimonials => TestimonialsWrite,
    CanDeleteTestimonials => TestimonialsDelete,
    CanReadTestaments => TestamentsRead,
    CanWriteTestaments => TestamentsWrite,
    CanDeleteTestaments => TestamentsDelete,
}

/// Extractor that requires `Authorization: Bearer <master key>`
#[derive(Debug, Clone, Copy)]
pub struct RequireMasterKey;

impl FromRequestParts<AppState> for RequireMasterKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        state.authorizer.require_master_key(authorization)?;

        Ok(RequireMasterKey)
    }
}

/// Extractor that requires an API key holding every permission in `P`
#[derive(Debug, Clone)]
pub struct RequirePermission<P: PermissionScope> {
    pub key: ApiKeyRecord,
    _scope: PhantomData<P>,
}

impl<P: PermissionScope> FromRequestParts<AppState> for RequirePermission<P> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = authorization_token(&parts.headers)?;
        let key = state.authorizer.verify(token, P::REQUIRED).await?;

        Ok(Self {
            key,
            _scope: PhantomData,
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`, same rule as the master key check
fn authorization_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    value
        .to_str()
        .ok()
        .and_then(api_key::bearer_token)
        .ok_or_else(|| ApiError::unauthorized("Malformed authorization header"))
}
