//! Project entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for ProjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid project id '{}'", s)))
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for ProjectId {
    fn storage_key(&self) -> String {
        self.0.to_string()
    }
}

/// Partial update applied to a project
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub preview_url: Option<String>,
    pub topics: Option<Vec<String>>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.repository_url.is_none()
            && self.preview_url.is_none()
            && self.topics.is_none()
    }
}

/// Portfolio project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    name: String,
    description: Option<String>,
    repository_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preview_url: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

impl StorageEntity for Project {
    type Key = ProjectId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl Project {
    pub fn new(name: impl Into<String>, repository_url: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: ProjectId::generate(),
            created_at: now,
            updated_at: now,
            name: name.into(),
            description: None,
            repository_url: repository_url.into(),
            preview_url: None,
            topics: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_preview_url(mut self, preview_url: Option<String>) -> Self {
        self.preview_url = preview_url;
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    // Mutators

    /// Apply the supplied fields and bump `updated_at`
    pub fn apply(&mut self, changes: ProjectChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }

        if let Some(description) = changes.description {
            self.description = Some(description);
        }

        if let Some(repository_url) = changes.repository_url {
            self.repository_url = repository_url;
        }

        if let Some(preview_url) = changes.preview_url {
            self.preview_url = Some(preview_url);
        }

        if let Some(topics) = changes.topics {
            self.topics = topics;
        }

        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_parse() {
        let id = ProjectId::generate();
        assert_eq!(id.to_string().parse::<ProjectId>().unwrap(), id);
        assert!("nope".parse::<ProjectId>().is_err());
    }

    #[test]
    fn test_apply_changes() {
        let mut project = Project::new("site", "https://github.com/me/site")
            .with_topics(vec!["rust".to_string()]);
        let before = project.updated_at();

        project.apply(ProjectChanges {
            name: Some("portfolio".to_string()),
            topics: Some(vec!["rust".to_string(), "axum".to_string()]),
            ..Default::default()
        });

        assert_eq!(project.name(), "portfolio");
        assert_eq!(project.repository_url(), "https://github.com/me/site");
        assert_eq!(project.topics().len(), 2);
        assert!(project.updated_at() >= before);
    }

    #[test]
    fn test_serialized_shape() {
        let project = Project::new("site", "https://github.com/me/site");
        let json = serde_json::to_value(&project).unwrap();

        assert_eq!(json["repositoryUrl"], "https://github.com/me/site");
        assert!(json["description"].is_null());
        assert!(json.get("previewUrl").is_none());
        assert_eq!(json["topics"], serde_json::json!([]));
    }

    #[test]
    fn test_empty_changes() {
        assert!(ProjectChanges::default().is_empty());
        assert!(!ProjectChanges {
            topics: Some(vec![]),
            ..Default::default()
        }
        .is_empty());
    }
}
