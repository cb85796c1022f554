//! API key secret generation
//!
//! Secrets are `sk-` followed by 29 lowercase hex characters drawn from the
//! thread-local CSPRNG.

use std::fmt::Debug;

use rand::RngCore;

use crate::domain::api_key::{SECRET_PREFIX, SECRET_RANDOM_LENGTH};

/// Source of candidate secrets for new keys
pub trait SecretGenerator: Send + Sync + Debug {
    fn generate(&self) -> String;
}

/// Generator backed by `rand::thread_rng`
#[derive(Debug, Clone, Default)]
pub struct RandomSecretGenerator;

impl RandomSecretGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> String {
        // Two hex chars per byte, rounded up then trimmed
        let mut random_bytes = [0u8; SECRET_RANDOM_LENGTH.div_ceil(2)];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let mut encoded = hex::encode(random_bytes);
        encoded.truncate(SECRET_RANDOM_LENGTH);

        format!("{}{}", SECRET_PREFIX, encoded)
    }
}

/// Constant-time string comparison to prevent timing attacks
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;

    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
