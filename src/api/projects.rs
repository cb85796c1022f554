//! Project endpoints, guarded by API key permissions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};

use crate::api::middleware::{
    limited, CanDeleteProjects, CanReadProjects, CanWriteProjects, RequirePermission,
};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Data, Json, Query};
use crate::domain::{Project, ProjectId, ProjectListQuery};
use crate::infrastructure::project::{CreateProjectRequest, UpdateProjectRequest};
use crate::infrastructure::rate_limiter::RateLimit;

pub fn create_projects_router(state: &AppState) -> Router<AppState> {
    let limiter = &state.rate_limiter;

    Router::new()
        .route(
            "/",
            limited(get(list_projects), limiter, "projects.list", RateLimit::per_minutes(300, 5)),
        )
        .route(
            "/create",
            limited(
                post(create_project),
                limiter,
                "projects.create",
                RateLimit::per_minutes(50, 30),
            ),
        )
        .route(
            "/update",
            limited(
                patch(update_project),
                limiter,
                "projects.update",
                RateLimit::per_minutes(10, 5),
            ),
        )
        .route(
            "/delete/{id}",
            limited(
                delete(delete_project),
                limiter,
                "projects.delete",
                RateLimit::per_minutes(50, 30),
            ),
        )
}

/// GET /projects
pub async fn list_projects(
    _guard: RequirePermission<CanReadProjects>,
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Data<Vec<Project>>, ApiError> {
    let projects = state.projects.list(&query).await?;

    Ok(Data::new(projects))
}

/// POST /projects/create
pub async fn create_project(
    _guard: RequirePermission<CanWriteProjects>,
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Data<Project>), ApiError> {
    let project = state.projects.create(request).await?;

    Ok((StatusCode::CREATED, Data::new(project)))
}

/// PATCH /projects/update
pub async fn update_project(
    _guard: RequirePermission<CanWriteProjects>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Data<Project>, ApiError> {
    let project = state.projects.update(request).await?;

    Ok(Data::new(project))
}

/// DELETE /projects/delete/{id}
pub async fn delete_project(
    _guard: RequirePermission<CanDeleteProjects>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Data<Project>, ApiError> {
    let id: ProjectId = id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid project id").with_param("id"))?;

    let project = state.projects.delete(&id).await?;

    Ok(Data::new(project))
}
