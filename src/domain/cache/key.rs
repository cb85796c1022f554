//! Cache key composition
//!
//! Two shapes are used:
//! - reference keys, `Namespace[ref:field]:value`, for single-entity lookups
//! - payload keys, `Namespace:[ref:payload]:([...])`, for memoized list queries

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainError;

/// Build a key addressing one entity by one of its fields
pub fn reference_key(namespace: &str, reference: &str, value: &str) -> String {
    format!("{}[ref:{}]:{}", namespace, reference, value)
}

/// Deterministic key for a list query payload
///
/// Components are kept in insertion order, so callers must always add the
/// payload fields in the same order. Absent fields should still be added
/// (as `None`) so that positions stay stable.
#[derive(Debug, Clone)]
pub struct PayloadKey {
    namespace: String,
    components: Vec<Value>,
}

impl PayloadKey {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            components: Vec::new(),
        }
    }

    /// Append one payload field
    pub fn component<T: Serialize>(mut self, value: &T) -> Self {
        self.components
            .push(serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    pub fn build(&self) -> String {
        format!(
            "{}:({})",
            Self::prefix(&self.namespace),
            Value::Array(self.components.clone())
        )
    }

    /// Glob matching every payload key of a namespace
    pub fn namespace_pattern(namespace: &str) -> String {
        format!("{}:*", Self::prefix(namespace))
    }

    fn prefix(namespace: &str) -> String {
        format!("{}:[ref:payload]", namespace)
    }
}

/// Compile a glob where `*` is the only wildcard into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, DomainError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("^{}$", body))
        .map_err(|e| DomainError::cache(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Escape Redis glob metacharacters so `text` matches only itself
pub fn escape_redis_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Translate a `*`-only glob into a Redis MATCH pattern
pub fn redis_match_pattern(pattern: &str) -> String {
    pattern
        .split('*')
        .map(escape_redis_glob)
        .collect::<Vec<_>>()
        .join("*")
}
