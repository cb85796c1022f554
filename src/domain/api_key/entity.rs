//! API key record and identifier

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Permission, PermissionSet};
use super::validation::ApiKeyValidationError;

/// API key identifier - a UUID assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ApiKeyId {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key record
///
/// The secret is the lookup key used during authorization; the id is only
/// used for administration (revocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    id: ApiKeyId,
    created_at: DateTime<Utc>,
    secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    permissions: PermissionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    revoked: bool,
}

impl ApiKeyRecord {
    /// Create a new, non-revoked record
    pub fn new(secret: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            id: ApiKeyId::generate(),
            created_at: Utc::now(),
            secret: secret.into(),
            description: None,
            permissions,
            expires_at: None,
            revoked: false,
        }
    }

    /// Rebuild a record loaded from persistent storage
    pub fn restore(
        id: ApiKeyId,
        created_at: DateTime<Utc>,
        secret: impl Into<String>,
        description: Option<String>,
        permissions: PermissionSet,
        expires_at: Option<DateTime<Utc>>,
        revoked: bool,
    ) -> Self {
        Self {
            id,
            created_at,
            secret: secret.into(),
            description,
            permissions,
            expires_at,
            revoked,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_expiration(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    // Status checks

    /// Expired when `now` is at or past the expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn grants_all(&self) -> bool {
        self.permissions.grants_all()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.grants_all() || self.permissions.contains(permission)
    }

    // Mutators

    /// Mark the key as revoked. Returns false when it already was.
    pub fn revoke(&mut self) -> bool {
        if self.revoked {
            return false;
        }

        self.revoked = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(permissions: &[Permission]) -> ApiKeyRecord {
        ApiKeyRecord::new(
            "sk-0123456789abcdef0123456789abc",
            permissions.iter().copied().collect(),
        )
    }

    #[test]
    fn test_api_key_id_parse() {
        let id = ApiKeyId::generate();
        let parsed: ApiKeyId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        assert!("not-a-uuid".parse::<ApiKeyId>().is_err());
    }

    #[test]
    fn test_new_record_defaults() {
        let key = record(&[Permission::FilesRead]);

        assert!(!key.is_revoked());
        assert!(!key.is_expired());
        assert!(key.expires_at().is_none());
        assert!(key.description().is_none());
        assert!(key.has_permission(Permission::FilesRead));
        assert!(!key.has_permission(Permission::FilesWrite));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let expires_at = Utc::now() + Duration::minutes(10);
        let key = record(&[]).with_expiration(Some(expires_at));

        assert!(!key.is_expired_at(expires_at - Duration::milliseconds(1)));
        assert!(key.is_expired_at(expires_at));
        assert!(key.is_expired_at(expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_wildcard_has_every_permission() {
        let key = record(&[Permission::GrantAll]);

        for permission in Permission::ALL {
            assert!(key.has_permission(permission));
        }
    }

    #[test]
    fn test_revoke_is_one_way() {
        let mut key = record(&[]);

        assert!(key.revoke());
        assert!(key.is_revoked());

        assert!(!key.revoke());
        assert!(key.is_revoked());
    }

    #[test]
    fn test_serialized_shape() {
        let key = record(&[Permission::ProjectsRead]).with_description(Some("ci".to_string()));
        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json["secret"], "sk-0123456789abcdef0123456789abc");
        assert_eq!(json["description"], "ci");
        assert_eq!(json["permissions"], serde_json::json!(["projects.read"]));
        assert_eq!(json["revoked"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("expiresAt").is_none());

        let back: ApiKeyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }
}
