//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod cache;
pub mod error;
pub mod listing;
pub mod project;
pub mod storage;
pub mod testimonial;

pub use api_key::{
    ApiKeyId, ApiKeyRecord, ApiKeyRepository, ApiKeyValidationError, Permission, PermissionSet,
};
pub use cache::{Cache, CacheExt, PayloadKey};
pub use error::DomainError;
pub use listing::SortOrder;
pub use project::{Project, ProjectChanges, ProjectId, ProjectListQuery};
pub use storage::{Storage, StorageEntity, StorageKey};
pub use testimonial::{Testimonial, TestimonialId, TestimonialKind, TestimonialListQuery};
