//! Project infrastructure - cached project management

mod service;

pub use service::{
    CreateProjectRequest, ProjectService, UpdateProjectRequest, DEFAULT_LIST_TTL, PROJECTS_TABLE,
};
