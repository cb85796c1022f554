//! Cache domain - Generic caching abstraction layer

mod key;
mod repository;

pub use key::{escape_redis_glob, glob_to_regex, redis_match_pattern, reference_key, PayloadKey};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
