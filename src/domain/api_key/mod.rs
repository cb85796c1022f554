//! API key domain
//!
//! Types and traits for API key records, the closed permission vocabulary
//! and the repository seam used by the key store.

mod entity;
mod permission;
mod repository;
mod validation;

pub use entity::{ApiKeyId, ApiKeyRecord};
pub use permission::{Permission, PermissionSet};
pub use repository::ApiKeyRepository;
pub use validation::{
    validate_secret_format, ApiKeyValidationError, SECRET_LENGTH, SECRET_PREFIX,
    SECRET_RANDOM_LENGTH,
};

#[cfg(test)]
pub use repository::MockApiKeyRepository;
