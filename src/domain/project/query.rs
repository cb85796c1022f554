//! Project list query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::entity::{Project, ProjectId};
use crate::domain::cache::PayloadKey;
use crate::domain::listing::{order_and_page, prefix_matches, within, SortOrder};

/// Cache namespace for project queries
pub const PROJECTS_CACHE_NAMESPACE: &str = "Projects";

/// Filters, ordering and paging for project listings
///
/// Every field is optional. String filters match by prefix, topics must all
/// be present on a project for it to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    /// Drop the cached result before reading
    #[serde(default, skip_serializing)]
    pub revalidate: Option<bool>,
    pub id: Option<ProjectId>,
    pub created_at_from: Option<DateTime<Utc>>,
    pub created_at_to: Option<DateTime<Utc>>,
    pub updated_at_from: Option<DateTime<Utc>>,
    pub updated_at_to: Option<DateTime<Utc>>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub preview_url: Option<String>,
    #[serde(default, deserialize_with = "comma_separated")]
    pub topics: Option<Vec<String>>,
}

impl ProjectListQuery {
    pub fn revalidate(&self) -> bool {
        self.revalidate.unwrap_or(false)
    }

    /// Cache key for this query, ignoring `revalidate`
    pub fn cache_key(&self) -> String {
        PayloadKey::new(PROJECTS_CACHE_NAMESPACE)
            .component(&self.id)
            .component(&self.created_at_from)
            .component(&self.created_at_to)
            .component(&self.updated_at_from)
            .component(&self.updated_at_to)
            .component(&self.skip)
            .component(&self.take)
            .component(&self.order)
            .component(&self.name)
            .component(&self.description)
            .component(&self.repository_url)
            .component(&self.preview_url)
            .component(&self.topics)
            .build()
    }

    pub fn matches(&self, project: &Project) -> bool {
        if self.id.is_some_and(|id| &id != project.id()) {
            return false;
        }

        if !within(project.created_at(), self.created_at_from, self.created_at_to) {
            return false;
        }

        if !within(project.updated_at(), self.updated_at_from, self.updated_at_to) {
            return false;
        }

        if !prefix_matches(self.name.as_deref(), Some(project.name())) {
            return false;
        }

        if !prefix_matches(self.description.as_deref(), project.description()) {
            return false;
        }

        if !prefix_matches(self.repository_url.as_deref(), Some(project.repository_url())) {
            return false;
        }

        if !prefix_matches(self.preview_url.as_deref(), project.preview_url()) {
            return false;
        }

        match &self.topics {
            Some(topics) => topics
                .iter()
                .all(|topic| project.topics().iter().any(|t| t == topic)),
            None => true,
        }
    }

    /// Filter, order by `createdAt`, then page
    pub fn apply(&self, projects: Vec<Project>) -> Vec<Project> {
        let matching: Vec<Project> = projects.into_iter().filter(|p| self.matches(p)).collect();

        order_and_page(matching, Project::created_at, self.order, self.skip, self.take)
    }
}

/// Accept `topics=a,b` from query strings
fn comma_separated<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    Ok(raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Vec<Project> {
        let base = Utc::now() - Duration::days(10);

        vec![
            Project::new("alpha", "https://github.com/me/alpha")
                .with_topics(vec!["rust".into(), "axum".into()])
                .with_created_at(base),
            Project::new("beta", "https://github.com/me/beta")
                .with_description(Some("A beta project".into()))
                .with_topics(vec!["rust".into()])
                .with_created_at(base + Duration::days(1)),
            Project::new("gamma", "https://gitlab.com/me/gamma").with_created_at(base + Duration::days(2)),
        ]
    }

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn test_default_query_returns_all_ascending() {
        let result = ProjectListQuery::default().apply(sample());
        assert_eq!(names(&result), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_descending_with_paging() {
        let query = ProjectListQuery {
            order: Some(SortOrder::Desc),
            skip: Some(1),
            take: Some(1),
            ..Default::default()
        };

        assert_eq!(names(&query.apply(sample())), vec!["beta"]);
    }

    #[test]
    fn test_topics_must_all_match() {
        let query = ProjectListQuery {
            topics: Some(vec!["rust".into(), "axum".into()]),
            ..Default::default()
        };

        assert_eq!(names(&query.apply(sample())), vec!["alpha"]);
    }

    #[test]
    fn test_prefix_filters() {
        let query = ProjectListQuery {
            repository_url: Some("https://github.com".into()),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(sample())), vec!["alpha", "beta"]);

        let query = ProjectListQuery {
            description: Some("A beta".into()),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(sample())), vec!["beta"]);
    }

    #[test]
    fn test_created_at_range() {
        let projects = sample();
        let from = projects[1].created_at();

        let query = ProjectListQuery {
            created_at_from: Some(from),
            ..Default::default()
        };

        assert_eq!(names(&query.apply(projects)), vec!["beta", "gamma"]);
    }

    #[test]
    fn test_cache_key_ignores_revalidate() {
        let plain = ProjectListQuery {
            name: Some("alpha".into()),
            ..Default::default()
        };
        let revalidating = ProjectListQuery {
            revalidate: Some(true),
            ..plain.clone()
        };

        assert_eq!(plain.cache_key(), revalidating.cache_key());
        assert!(plain.cache_key().starts_with("Projects:[ref:payload]:("));
        assert_ne!(plain.cache_key(), ProjectListQuery::default().cache_key());
    }

    #[test]
    fn test_topics_from_comma_separated_json_string() {
        let query: ProjectListQuery =
            serde_json::from_str(r#"{"topics":"rust, axum,","revalidate":true}"#).unwrap();

        assert_eq!(query.topics, Some(vec!["rust".to_string(), "axum".to_string()]));
        assert!(query.revalidate());
    }
}
