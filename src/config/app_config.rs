use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::StorageConfig;

/// Environment variable that may carry the master key
pub const MASTER_KEY_ENV: &str = "AUTH_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Guards the key administration routes
    pub master_key: String,
    /// Lifetime of cached key lookups
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("master_key", &"<redacted>")
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; empty or `*` allows any
    pub origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.origins.is_empty() || self.origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AuthConfig {
    /// The server refuses to start without a master key; `migrate` does not need one
    pub fn require_master_key(&self) -> Result<(), DomainError> {
        if self.master_key.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "auth.master_key (or {}) must be set",
                MASTER_KEY_ENV
            )));
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            master_key: String::new(),
            cache_ttl_secs: 300,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.origins"),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;

        if app_config.auth.master_key.is_empty() {
            if let Ok(key) = std::env::var(MASTER_KEY_ENV) {
                app_config.auth.master_key = key;
            }
        }

        Ok(app_config)
    }

    /// Reject settings no command can run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.auth.cache_ttl_secs == 0 {
            return Err(DomainError::configuration(
                "auth.cache_ttl_secs must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheType;
    use crate::infrastructure::storage::StorageType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.auth.cache_ttl_secs, 300);
        assert_eq!(config.cache.cache_type, CacheType::InMemory);
        assert_eq!(config.storage.storage_type, StorageType::InMemory);
        assert!(config.cors.allows_any());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_empty_master_key_is_rejected_for_serving() {
        let config = AppConfig::default();
        assert!(matches!(
            config.auth.require_master_key(),
            Err(DomainError::Configuration { .. })
        ));

        let mut config = AppConfig::default();
        config.auth.master_key = "   ".to_string();
        assert!(config.auth.require_master_key().is_err());

        config.auth.master_key = "secret".to_string();
        assert!(config.auth.require_master_key().is_ok());
    }

    #[test]
    fn test_validate_does_not_need_master_key() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.auth.cache_ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "server": {"port": 8080},
                "logging": {"format": "json"},
                "auth": {"master_key": "k"},
                "cache": {"cache_type": "redis", "redis_url": "redis://cache:6379"},
                "cors": {"origins": ["https://example.com"]}
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.cache.cache_type, CacheType::Redis);
        assert_eq!(config.cache.key_prefix, "Portfolio:[Global]:CacheService");
        assert!(!config.cors.allows_any());
    }

    #[test]
    fn test_debug_redacts_master_key() {
        let mut config = AppConfig::default();
        config.auth.master_key = "very-secret".to_string();

        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
