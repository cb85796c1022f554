mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CorsConfig, LogFormat, LoggingConfig, ServerConfig, MASTER_KEY_ENV,
};
