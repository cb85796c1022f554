//! Closed permission vocabulary for API keys

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::ApiKeyValidationError;

/// A single permission token
///
/// Serialized as its dotted token (e.g. `projects.read`). `grant-all` is the
/// wildcard and satisfies any check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "files.read")]
    FilesRead,
    #[serde(rename = "files.write")]
    FilesWrite,
    #[serde(rename = "files.delete")]
    FilesDelete,
    #[serde(rename = "projects.read")]
    ProjectsRead,
    #[serde(rename = "projects.write")]
    ProjectsWrite,
    #[serde(rename = "projects.delete")]
    ProjectsDelete,
    #[serde(rename = "testimonials.read")]
    TestimonialsRead,
    #[serde(rename = "testimonials.write")]
    TestimonialsWrite,
    #[serde(rename = "testimonials.delete")]
    TestimonialsDelete,
    #[serde(rename = "testaments.read")]
    TestamentsRead,
    #[serde(rename = "testaments.write")]
    TestamentsWrite,
    #[serde(rename = "testaments.delete")]
    TestamentsDelete,
    #[serde(rename = "emails.write")]
    EmailsWrite,
    #[serde(rename = "grant-all")]
    GrantAll,
}

impl Permission {
    /// Every token in the vocabulary
    pub const ALL: [Permission; 14] = [
        Self::FilesRead,
        Self::FilesWrite,
        Self::FilesDelete,
        Self::ProjectsRead,
        Self::ProjectsWrite,
        Self::ProjectsDelete,
        Self::TestimonialsRead,
        Self::TestimonialsWrite,
        Self::TestimonialsDelete,
        Self::TestamentsRead,
        Self::TestamentsWrite,
        Self::TestamentsDelete,
        Self::EmailsWrite,
        Self::GrantAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilesRead => "files.read",
            Self::FilesWrite => "files.write",
            Self::FilesDelete => "files.delete",
            Self::ProjectsRead => "projects.read",
            Self::ProjectsWrite => "projects.write",
            Self::ProjectsDelete => "projects.delete",
            Self::TestimonialsRead => "testimonials.read",
            Self::TestimonialsWrite => "testimonials.write",
            Self::TestimonialsDelete => "testimonials.delete",
            Self::TestamentsRead => "testaments.read",
            Self::TestamentsWrite => "testaments.write",
            Self::TestamentsDelete => "testaments.delete",
            Self::EmailsWrite => "emails.write",
            Self::GrantAll => "grant-all",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::GrantAll)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ApiKeyValidationError::UnknownPermission(s.to_string()))
    }
}

/// Set of permissions held by a key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Whether the set holds the wildcard
    pub fn grants_all(&self) -> bool {
        self.contains(Permission::GrantAll)
    }

    /// First required permission not held by this set, ignoring the wildcard
    pub fn first_missing(&self, required: &[Permission]) -> Option<Permission> {
        required.iter().copied().find(|p| !self.contains(*p))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Permission tokens as stored in the database
    pub fn to_tokens(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }

    /// Parse stored tokens back into a set
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ApiKeyValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .map(|t| t.as_ref().parse::<Permission>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
