//! API key infrastructure
//!
//! Secret generation, repository backends, the caching key store and the
//! authorizer built on top of it.

mod authorizer;
mod generator;
mod in_memory;
mod key_store;
mod postgres;

pub use authorizer::{bearer_token, Authorizer};
pub use generator::{RandomSecretGenerator, SecretGenerator};
pub use in_memory::InMemoryApiKeyRepository;
pub use key_store::{
    secret_cache_key, ApiKeyStore, NewApiKey, DEFAULT_CACHE_TTL, MAX_SECRET_ATTEMPTS,
};
pub use postgres::PostgresApiKeyRepository;
