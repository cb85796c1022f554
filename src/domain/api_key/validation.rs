//! API key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Invalid API key ID '{0}': expected a UUID")]
    InvalidId(String),

    #[error("Unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("API key secret must start with '{}'", SECRET_PREFIX)]
    MissingPrefix,

    #[error("API key secret must be exactly {} characters long", SECRET_LENGTH)]
    InvalidLength,

    #[error("API key secret contains invalid character: '{0}'")]
    InvalidCharacter(char),
}

/// Marker every generated secret starts with
pub const SECRET_PREFIX: &str = "sk-";

/// Number of random hex characters following the prefix
pub const SECRET_RANDOM_LENGTH: usize = 29;

/// Total secret length
pub const SECRET_LENGTH: usize = SECRET_PREFIX.len() + SECRET_RANDOM_LENGTH;

/// Validate the shape of an API key secret
///
/// Rules:
/// - Starts with `sk-`
/// - Exactly 32 characters long
/// - Everything after the prefix is lowercase hexadecimal
pub fn validate_secret_format(secret: &str) -> Result<(), ApiKeyValidationError> {
    let Some(random) = secret.strip_prefix(SECRET_PREFIX) else {
        return Err(ApiKeyValidationError::MissingPrefix);
    };

    if secret.len() != SECRET_LENGTH {
        return Err(ApiKeyValidationError::InvalidLength);
    }

    if let Some(c) = random
        .chars()
        .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
    {
        return Err(ApiKeyValidationError::InvalidCharacter(c));
    }

    Ok(())
}
