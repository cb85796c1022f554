//! Request authorization against API keys and the master key

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::api_key::{ApiKeyRecord, Permission};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_auth_decision, AuthOutcome};

use super::generator::constant_time_compare;
use super::key_store::{invalid_api_key, ApiKeyStore};

const BEARER_PREFIX: &str = "Bearer ";

/// Token carried by an `Authorization: Bearer <token>` value, taken verbatim
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Decides whether a presented credential may proceed
#[derive(Clone)]
pub struct Authorizer {
    store: Arc<ApiKeyStore>,
    master_key: String,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("store", &self.store)
            .field("master_key", &"<redacted>")
            .finish()
    }
}

impl Authorizer {
    pub fn new(store: Arc<ApiKeyStore>, master_key: impl Into<String>) -> Self {
        Self {
            store,
            master_key: master_key.into(),
        }
    }

    pub fn store(&self) -> &Arc<ApiKeyStore> {
        &self.store
    }

    /// Verify `secret` holds every permission in `required`
    pub async fn verify(
        &self,
        secret: &str,
        required: &[Permission],
    ) -> Result<ApiKeyRecord, DomainError> {
        self.verify_at(secret, required, Utc::now()).await
    }

    /// [`verify`](Self::verify) evaluated at a fixed instant
    ///
    /// Checks run in order and stop at the first failure: the key must
    /// exist, must not be revoked, must not be expired at `now`, then must
    /// either grant everything or hold each required permission.
    pub async fn verify_at(
        &self,
        secret: &str,
        required: &[Permission],
        now: DateTime<Utc>,
    ) -> Result<ApiKeyRecord, DomainError> {
        let record = match self.store.find_by_secret(secret).await {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "API key lookup failed");
                return Err(deny(AuthOutcome::InvalidKey, invalid_api_key()));
            }
        };

        if record.is_revoked() {
            debug!(api_key_id = %record.id(), "Rejected revoked API key");
            return Err(deny(
                AuthOutcome::Revoked,
                DomainError::unauthorized("API key revoked"),
            ));
        }

        if record.is_expired_at(now) {
            debug!(api_key_id = %record.id(), "Rejected expired API key");
            return Err(deny(
                AuthOutcome::Expired,
                DomainError::unauthorized("API key expired"),
            ));
        }

        if !record.grants_all() {
            if let Some(missing) = record.permissions().first_missing(required) {
                debug!(api_key_id = %record.id(), missing = %missing, "API key lacks permission");
                return Err(deny(
                    AuthOutcome::MissingPermission,
                    DomainError::unauthorized(format!("No permission for {}", missing)),
                ));
            }
        }

        record_auth_decision(AuthOutcome::Allowed);
        Ok(record)
    }

    /// Check an `Authorization` header value against the master key
    pub fn require_master_key(&self, authorization: Option<&str>) -> Result<(), DomainError> {
        let token = authorization.and_then(bearer_token);

        match token {
            Some(token) if constant_time_compare(token, &self.master_key) => {
                record_auth_decision(AuthOutcome::MasterKeyAllowed);
                Ok(())
            }
            _ => {
                debug!("Master key check failed");
                Err(deny(
                    AuthOutcome::MasterKeyDenied,
                    DomainError::unauthorized("Invalid master key"),
                ))
            }
        }
    }
}

fn deny(outcome: AuthOutcome, error: DomainError) -> DomainError {
    record_auth_decision(outcome);
    error
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::api_key::{ApiKeyRepository, MockApiKeyRepository, PermissionSet};
    use crate::domain::cache::MockCache;
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;

    const MASTER_KEY: &str = "master-secret";
    const SECRET: &str = "sk-0123456789abcdef0123456789abc";

    struct Fixture {
        authorizer: Authorizer,
        repository: Arc<InMemoryApiKeyRepository>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryApiKeyRepository::new());
        let store = ApiKeyStore::new(repository.clone(), Arc::new(MockCache::new()));

        Fixture {
            authorizer: Authorizer::new(Arc::new(store), MASTER_KEY),
            repository,
        }
    }

    async fn insert(
        fixture: &Fixture,
        permissions: &[Permission],
        expires_at: Option<DateTime<Utc>>,
    ) -> ApiKeyRecord {
        let record = ApiKeyRecord::new(SECRET, permissions.iter().copied().collect::<PermissionSet>())
            .with_expiration(expires_at);
        fixture.repository.create(record).await.unwrap()
    }

    fn message(error: DomainError) -> String {
        match error {
            DomainError::Unauthorized { message } => message,
            other => panic!("expected unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_permission_subsets() {
        use Permission::*;

        let f = fixture();
        insert(&f, &[ProjectsRead, ProjectsWrite], None).await;

        let allowed: [&[Permission]; 4] = [
            &[],
            &[ProjectsRead],
            &[ProjectsWrite],
            &[ProjectsRead, ProjectsWrite],
        ];

        for required in allowed {
            assert!(f.authorizer.verify(SECRET, required).await.is_ok());
        }

        let err = f.authorizer.verify(SECRET, &[ProjectsDelete]).await.unwrap_err();
        assert_eq!(message(err), "No permission for projects.delete");

        let err = f
            .authorizer
            .verify(SECRET, &[ProjectsRead, FilesRead])
            .await
            .unwrap_err();
        assert_eq!(message(err), "No permission for files.read");
    }

    #[tokio::test]
    async fn test_grant_all_passes_any_requirement() {
        let f = fixture();
        insert(&f, &[Permission::GrantAll], Some(Utc::now() + Duration::days(1))).await;

        assert!(f.authorizer.verify(SECRET, &Permission::ALL).await.is_ok());
        assert!(f
            .authorizer
            .verify(SECRET, &[Permission::EmailsWrite])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let f = fixture();
        let expires_at = Utc::now() + Duration::hours(1);
        insert(&f, &[Permission::FilesRead], Some(expires_at)).await;

        let before = expires_at - Duration::seconds(1);
        assert!(f
            .authorizer
            .verify_at(SECRET, &[Permission::FilesRead], before)
            .await
            .is_ok());

        for now in [expires_at, expires_at + Duration::seconds(1)] {
            let err = f
                .authorizer
                .verify_at(SECRET, &[Permission::FilesRead], now)
                .await
                .unwrap_err();
            assert_eq!(message(err), "API key expired");
        }
    }

    #[tokio::test]
    async fn test_expired_grant_all_is_rejected() {
        let f = fixture();
        let expires_at = Utc::now() + Duration::minutes(5);
        insert(&f, &[Permission::GrantAll], Some(expires_at)).await;

        let err = f
            .authorizer
            .verify_at(SECRET, &[], expires_at)
            .await
            .unwrap_err();
        assert_eq!(message(err), "API key expired");
    }

    #[tokio::test]
    async fn test_revoked_key_is_rejected() {
        let f = fixture();
        let record = insert(&f, &[Permission::GrantAll], Some(Utc::now() + Duration::days(1))).await;

        assert!(f.authorizer.verify(SECRET, &[]).await.is_ok());

        f.authorizer.store().revoke_by_id(record.id()).await.unwrap();

        let err = f.authorizer.verify(SECRET, &[]).await.unwrap_err();
        assert_eq!(message(err), "API key revoked");
    }

    #[tokio::test]
    async fn test_revocation_wins_over_expiry() {
        let f = fixture();
        let mut record = insert(&f, &[Permission::FilesRead], Some(Utc::now() - Duration::days(1))).await;
        record.revoke();
        f.repository.update(&record).await.unwrap();

        let err = f.authorizer.verify(SECRET, &[]).await.unwrap_err();
        assert_eq!(message(err), "API key revoked");
    }

    #[tokio::test]
    async fn test_unknown_key_is_invalid() {
        let f = fixture();

        let err = f.authorizer.verify(SECRET, &[]).await.unwrap_err();
        assert_eq!(message(err), "Invalid api key");

        let err = f.authorizer.verify("not-a-key", &[]).await.unwrap_err();
        assert_eq!(message(err), "Invalid api key");
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_as_invalid_key() {
        let mut repository = MockApiKeyRepository::new();
        repository
            .expect_get_by_secret()
            .returning(|_| Err(DomainError::storage("connection refused")));

        let store = ApiKeyStore::new(Arc::new(repository), Arc::new(MockCache::new()));
        let authorizer = Authorizer::new(Arc::new(store), MASTER_KEY);

        let err = authorizer.verify(SECRET, &[]).await.unwrap_err();
        assert_eq!(message(err), "Invalid api key");
    }

    #[test]
    fn test_require_master_key() {
        let f = fixture();

        assert!(f.authorizer.require_master_key(Some("Bearer master-secret")).is_ok());

        for header in [
            None,
            Some("master-secret"),
            Some("Basic master-secret"),
            Some("bearer master-secret"),
            Some("Bearer master-secre"),
            Some("Bearer master-secret "),
            Some("Bearer "),
        ] {
            assert!(
                f.authorizer.require_master_key(header).is_err(),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn test_bearer_token_is_not_trimmed() {
        assert_eq!(bearer_token("Bearer sk-abc"), Some("sk-abc"));
        assert_eq!(bearer_token("Bearer  sk-abc "), Some(" sk-abc "));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer sk-abc"), None);
    }

    #[test]
    fn test_debug_redacts_master_key() {
        let f = fixture();
        let debug = format!("{:?}", f.authorizer);

        assert!(!debug.contains(MASTER_KEY));
    }
}
