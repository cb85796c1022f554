//! Query string extractor that returns errors as JSON

use axum::{
    extract::{FromRequestParts, Query as AxumQuery},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// `axum::extract::Query` with rejections in the API error format
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T> std::ops::Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumQuery(value)| Query(value))
            .map_err(|rejection| {
                ApiError::bad_request(format!("Invalid query: {}", rejection.body_text()))
                    .with_code("query_parse_error")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use crate::domain::ProjectListQuery;

    async fn extract(uri: &str) -> Result<Query<ProjectListQuery>, ApiError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        Query::<ProjectListQuery>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_parses_project_query() {
        let query = extract("/projects?take=2&order=desc&topics=rust,axum&revalidate=true")
            .await
            .unwrap();

        assert_eq!(query.take, Some(2));
        assert_eq!(query.topics.as_deref(), Some(&["rust".to_string(), "axum".to_string()][..]));
        assert!(query.revalidate());
    }

    #[tokio::test]
    async fn test_bad_value_is_bad_request() {
        let err = extract("/projects?order=sideways").await.unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.code.as_deref(), Some("query_parse_error"));
    }
}
