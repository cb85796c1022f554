//! API key store
//!
//! Persists API key records and serves lookups by secret through the cache.
//! The repository stays the source of truth: cache failures degrade to a
//! miss, storage failures surface as internal errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::api_key::{
    validate_secret_format, ApiKeyId, ApiKeyRecord, ApiKeyRepository, PermissionSet,
};
use crate::domain::cache::{reference_key, Cache, CacheExt};
use crate::domain::DomainError;

use super::generator::{RandomSecretGenerator, SecretGenerator};

/// Attempts at drawing an unused secret before giving up
pub const MAX_SECRET_ATTEMPTS: usize = 5;

/// Default lifetime of cached lookups, positive and negative alike
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

const CACHE_NAMESPACE: &str = "AuthApiKey";

/// Cache key for a lookup by secret
pub fn secret_cache_key(secret: &str) -> String {
    reference_key(CACHE_NAMESPACE, "key", secret)
}

pub(crate) fn invalid_api_key() -> DomainError {
    DomainError::unauthorized("Invalid api key")
}

/// Input for creating a key
#[derive(Debug, Clone, Default)]
pub struct NewApiKey {
    pub description: Option<String>,
    pub permissions: PermissionSet,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    repository: Arc<dyn ApiKeyRepository>,
    cache: Arc<dyn Cache>,
    generator: Arc<dyn SecretGenerator>,
    cache_ttl: Duration,
}

impl ApiKeyStore {
    pub fn new(repository: Arc<dyn ApiKeyRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            repository,
            cache,
            generator: Arc::new(RandomSecretGenerator::new()),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn SecretGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Create and persist a key with a freshly generated secret
    ///
    /// A wildcard key must carry an expiration. Secrets that are already
    /// taken, either seen up front or reported as a conflict on insert, are
    /// redrawn up to [`MAX_SECRET_ATTEMPTS`] times.
    pub async fn create(&self, request: NewApiKey) -> Result<ApiKeyRecord, DomainError> {
        if request.permissions.grants_all() && request.expires_at.is_none() {
            return Err(DomainError::forbidden("grant-all requires expiration"));
        }

        for attempt in 1..=MAX_SECRET_ATTEMPTS {
            let secret = self.generator.generate();

            if self
                .repository
                .secret_exists(&secret)
                .await
                .map_err(storage_failure)?
            {
                debug!(attempt, "Generated API key secret already taken, retrying");
                continue;
            }

            let record = ApiKeyRecord::new(secret, request.permissions.clone())
                .with_description(request.description.clone())
                .with_expiration(request.expires_at);

            match self.repository.create(record).await {
                Ok(created) => {
                    // A stale negative entry for this secret would hide the new key
                    self.evict(created.secret()).await;

                    info!(
                        api_key_id = %created.id(),
                        permissions = ?created.permissions().to_tokens(),
                        expires_at = ?created.expires_at(),
                        "API key created"
                    );
                    return Ok(created);
                }
                Err(DomainError::Conflict { .. }) => {
                    debug!(attempt, "API key secret conflicted on insert, retrying");
                }
                Err(e) => return Err(storage_failure(e)),
            }
        }

        error!(
            attempts = MAX_SECRET_ATTEMPTS,
            "Could not generate an unused API key secret"
        );
        Err(DomainError::internal(
            "Could not generate a unique API key secret",
        ))
    }

    /// Resolve a presented secret to its record
    ///
    /// Absent keys are cached as well, so repeated probes with the same
    /// unknown secret do not reach storage. Secrets that cannot have been
    /// issued are rejected before touching the cache.
    pub async fn find_by_secret(&self, secret: &str) -> Result<ApiKeyRecord, DomainError> {
        if validate_secret_format(secret).is_err() {
            return Err(invalid_api_key());
        }

        let key = secret_cache_key(secret);

        match self.cache.get::<Option<ApiKeyRecord>>(&key).await {
            Ok(Some(Some(record))) => return Ok(record),
            Ok(Some(None)) => return Err(invalid_api_key()),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "API key cache read failed, falling back to storage"),
        }

        let found = self
            .repository
            .get_by_secret(secret)
            .await
            .map_err(storage_failure)?;

        if let Err(e) = self.cache.set(&key, &found, self.cache_ttl).await {
            warn!(error = %e, "Failed to cache API key lookup");
        }

        found.ok_or_else(invalid_api_key)
    }

    /// Revoke a key by id and evict its cached lookup
    ///
    /// Revoking an already revoked key succeeds without writing again.
    pub async fn revoke_by_id(&self, id: &ApiKeyId) -> Result<ApiKeyRecord, DomainError> {
        let mut record = self
            .repository
            .get(id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        if record.revoke() {
            record = self
                .repository
                .update(&record)
                .await
                .map_err(storage_failure)?;
            info!(api_key_id = %id, "API key revoked");
        } else {
            debug!(api_key_id = %id, "API key already revoked");
        }

        self.evict(record.secret()).await;

        Ok(record)
    }

    async fn evict(&self, secret: &str) {
        if let Err(e) = self.cache.delete(&secret_cache_key(secret)).await {
            warn!(error = %e, "Failed to evict cached API key");
        }
    }
}

fn storage_failure(e: DomainError) -> DomainError {
    error!(error = %e, "API key storage operation failed");
    DomainError::internal("API key storage unavailable")
}
