use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
    pub geocoder: GeocoderConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    /// Base URL used in links sent by e-mail when the request carries no Host header
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: i64,
    pub max_limit: Option<i64>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub cookie_expiry_days: i64,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
    pub reset_token_expiry_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP relay endpoint; when unset, messages are only logged
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment)
            .with_overrides(|key| env::var(key).ok())
            .validated()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Apply overrides from a key lookup (the process environment in `from_env`).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Some(v) = lookup("PUBLIC_URL") {
            self.api.public_url = v.trim_end_matches('/').to_string();
        }

        if let Some(v) = lookup("QUERY_DEFAULT_LIMIT") {
            self.query.default_limit = v.parse().unwrap_or(self.query.default_limit);
        }
        if let Some(v) = lookup("QUERY_MAX_LIMIT") {
            self.query.max_limit = v.parse().ok();
        }
        if let Some(v) = lookup("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRE") {
            self.security.jwt_expiry_days = parse_days(&v).unwrap_or(self.security.jwt_expiry_days);
        }
        if let Some(v) = lookup("JWT_COOKIE_EXPIRE") {
            self.security.cookie_expiry_days = parse_days(&v).unwrap_or(self.security.cookie_expiry_days);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(v) = lookup("FILE_UPLOAD_PATH") {
            self.upload.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_FILE_UPLOAD") {
            self.upload.max_file_size = v.parse().unwrap_or(self.upload.max_file_size);
        }

        if let Some(v) = lookup("GEOCODER_BASE_URL") {
            self.geocoder.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("GEOCODER_API_KEY") {
            self.geocoder.api_key = Some(v);
        }

        if let Some(v) = lookup("MAIL_RELAY_URL") {
            self.mail.relay_url = Some(v);
        }
        if let Some(v) = lookup("MAIL_API_KEY") {
            self.mail.api_key = Some(v);
        }
        if let Some(v) = lookup("FROM_EMAIL") {
            self.mail.from_email = v;
        }
        if let Some(v) = lookup("FROM_NAME") {
            self.mail.from_name = v;
        }

        self
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.query.default_limit <= 0 {
            return Err(ConfigError::Invalid {
                key: "QUERY_DEFAULT_LIMIT",
                value: self.query.default_limit.to_string(),
            });
        }
        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                public_url: "http://localhost:5000".to_string(),
            },
            query: QueryConfig {
                default_limit: 25,
                max_limit: Some(1000),
                debug_logging: true,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_days: 30,
                cookie_expiry_days: 30,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                secure_cookies: false,
                reset_token_expiry_minutes: 10,
            },
            upload: UploadConfig {
                dir: PathBuf::from("./public/uploads"),
                max_file_size: 1_000_000,
            },
            geocoder: GeocoderConfig {
                base_url: "https://www.mapquestapi.com".to_string(),
                api_key: None,
            },
            mail: MailConfig {
                relay_url: None,
                api_key: None,
                from_email: "noreply@devcamper.io".to_string(),
                from_name: "DevCamper".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.max_request_size_bytes = 5 * 1024 * 1024; // 5MB
        config.api.public_url = "https://staging.devcamper.io".to_string();
        config.query.max_limit = Some(500);
        config.query.debug_logging = false;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://staging.devcamper.io".to_string()];
        config.security.secure_cookies = true;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 2 * 1024 * 1024; // 2MB
        config.api.public_url = "https://devcamper.io".to_string();
        config.query.max_limit = Some(100);
        config.query.debug_logging = false;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cors_origins = vec!["https://devcamper.io".to_string()];
        config.security.secure_cookies = true;
        config
    }
}

/// Accepts plain day counts as well as the `30d` shorthand.
fn parse_days(value: &str) -> Option<i64> {
    value.trim().trim_end_matches('d').parse().ok().filter(|days: &i64| *days > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.query.default_limit, 25);
        assert_eq!(config.query.max_limit, Some(1000));
        assert!(!config.security.secure_cookies);
        assert_eq!(config.security.reset_token_expiry_minutes, 10);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.is_production());
        assert!(config.security.secure_cookies);
        assert_eq!(config.query.max_limit, Some(100));
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn overrides_apply_on_top_of_presets() {
        let config = AppConfig::development().with_overrides(lookup(&[
            ("PORT", "8080"),
            ("JWT_EXPIRE", "7d"),
            ("JWT_COOKIE_EXPIRE", "14"),
            ("MAX_FILE_UPLOAD", "2048"),
            ("SECURITY_CORS_ORIGINS", "https://a.test, https://b.test"),
            ("GEOCODER_BASE_URL", "http://geo.local/"),
        ]));

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.security.jwt_expiry_days, 7);
        assert_eq!(config.security.cookie_expiry_days, 14);
        assert_eq!(config.upload.max_file_size, 2048);
        assert_eq!(config.security.cors_origins, vec!["https://a.test", "https://b.test"]);
        assert_eq!(config.geocoder.base_url, "http://geo.local");
    }

    #[test]
    fn malformed_overrides_keep_preset_values() {
        let config = AppConfig::development().with_overrides(lookup(&[
            ("PORT", "not-a-port"),
            ("JWT_EXPIRE", "-3d"),
        ]));
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.security.jwt_expiry_days, 30);
    }

    #[test]
    fn validation_requires_database_url_and_secret() {
        let missing_db = AppConfig::development().validated();
        assert!(matches!(missing_db, Err(ConfigError::Missing("DATABASE_URL"))));

        let missing_secret = AppConfig::development()
            .with_overrides(lookup(&[("DATABASE_URL", "postgres://localhost/devcamper")]))
            .validated();
        assert!(matches!(missing_secret, Err(ConfigError::Missing("JWT_SECRET"))));

        let ok = AppConfig::development()
            .with_overrides(lookup(&[
                ("DATABASE_URL", "postgres://localhost/devcamper"),
                ("JWT_SECRET", "secret"),
            ]))
            .validated();
        assert!(ok.is_ok());
    }
}
