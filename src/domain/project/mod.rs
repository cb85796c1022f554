//! Project domain - portfolio projects served to the public site

mod entity;
mod query;

pub use entity::{Project, ProjectChanges, ProjectId};
pub use query::{ProjectListQuery, PROJECTS_CACHE_NAMESPACE};
