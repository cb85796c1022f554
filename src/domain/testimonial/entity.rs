//! Testimonial entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestimonialId(Uuid);

impl TestimonialId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for TestimonialId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("Invalid testimonial id '{}'", s)))
    }
}

impl fmt::Display for TestimonialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for TestimonialId {
    fn storage_key(&self) -> String {
        self.0.to_string()
    }
}

/// An endorsement left by a visitor, either a testimonial or a testament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    id: TestimonialId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author: String,
    bio: Option<String>,
    content: String,
}

impl StorageEntity for Testimonial {
    type Key = TestimonialId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl Testimonial {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: TestimonialId::generate(),
            created_at: now,
            updated_at: now,
            author: author.into(),
            bio: None,
            content: content.into(),
        }
    }

    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = bio;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    pub fn id(&self) -> &TestimonialId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
