//! Storage entity traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be used as storage keys
pub trait StorageKey: Clone + Debug + Send + Sync + Eq + std::hash::Hash {
    /// String form used as the primary key by storage backends
    fn storage_key(&self) -> String;
}

impl StorageKey for uuid::Uuid {
    fn storage_key(&self) -> String {
        self.to_string()
    }
}

/// Trait for types that can be stored as JSON documents
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// The key type for this entity
    type Key: StorageKey;

    /// Returns the entity's key
    fn key(&self) -> &Self::Key;
}
