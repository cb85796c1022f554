//! API key administration endpoints, guarded by the master key

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::{limited, RequireMasterKey};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Data, Json};
use crate::domain::api_key::{ApiKeyId, ApiKeyRecord, PermissionSet};
use crate::infrastructure::api_key::NewApiKey;
use crate::infrastructure::rate_limiter::RateLimit;

pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    let limiter = &state.rate_limiter;

    Router::new()
        .route(
            "/create",
            limited(post(create_key), limiter, "auth.create", RateLimit::per_minutes(5, 5)),
        )
        .route(
            "/revoke/{id}",
            limited(delete(revoke_key), limiter, "auth.revoke", RateLimit::per_minutes(20, 5)),
        )
        .route(
            "/{key}",
            limited(get(get_key), limiter, "auth.get", RateLimit::per_minutes(60, 1)),
        )
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApiKeyRequest {
    #[serde(default)]
    pub description: Option<String>,
    pub permissions: PermissionSet,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreateApiKeyRequest> for NewApiKey {
    fn from(request: CreateApiKeyRequest) -> Self {
        Self {
            description: request.description,
            permissions: request.permissions,
            expires_at: request.expires_at,
        }
    }
}

/// POST /auth/create
pub async fn create_key(
    _guard: RequireMasterKey,
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Data<ApiKeyRecord>), ApiError> {
    let record = state.key_store().create(request.into()).await?;

    Ok((StatusCode::CREATED, Data::new(record)))
}

/// GET /auth/{key}
pub async fn get_key(
    _guard: RequireMasterKey,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Data<ApiKeyRecord>, ApiError> {
    let record = state.key_store().find_by_secret(&key).await?;

    Ok(Data::new(record))
}

/// DELETE /auth/revoke/{id}
pub async fn revoke_key(
    _guard: RequireMasterKey,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Data<ApiKeyRecord>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map(ApiKeyId::from_uuid)
        .map_err(|_| ApiError::bad_request("Invalid API key id").with_param("id"))?;

    let record = state.key_store().revoke_by_id(&id).await?;

    Ok(Data::new(record))
}
