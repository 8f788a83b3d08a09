use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub coaching: CoachingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `DATABASE_URL`; without it development runs on the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// HS256 secret shared with the identity provider.
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    /// Expected `iss` claim, if the provider sets one.
    pub jwt_issuer: Option<String>,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingConfig {
    /// Window used by the upcoming follow-ups query when the caller gives none.
    pub default_days_ahead: i64,
    pub max_days_ahead: i64,
}

/// Largest follow-up window the server accepts (ten years).
pub const MAX_DAYS_AHEAD_LIMIT: i64 = 3650;

/// Longest token lifetime in hours (one leap year).
pub const MAX_TOKEN_HOURS: i64 = 24 * 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECURITY_JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("DATABASE_URL must be set outside development")]
    MissingDatabaseUrl,

    #[error("COACHING_DEFAULT_DAYS_AHEAD ({default}) must be within 0..={max}")]
    InvalidDaysAhead { default: i64, max: i64 },

    #[error("COACHING_MAX_DAYS_AHEAD ({0}) must be within 0..={MAX_DAYS_AHEAD_LIMIT}")]
    DaysAheadLimit(i64),

    #[error("SECURITY_JWT_EXPIRY_HOURS ({0}) must be within 1..={MAX_TOKEN_HOURS}")]
    TokenLifetime(u64),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_ISSUER") {
            self.security.jwt_issuer = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Coaching overrides
        if let Ok(v) = env::var("COACHING_DEFAULT_DAYS_AHEAD") {
            self.coaching.default_days_ahead = v.parse().unwrap_or(self.coaching.default_days_ahead);
        }
        if let Ok(v) = env::var("COACHING_MAX_DAYS_AHEAD") {
            self.coaching.max_days_ahead = v.parse().unwrap_or(self.coaching.max_days_ahead);
        }

        self
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_development() {
            if self.security.jwt_secret.is_empty() {
                return Err(ConfigError::MissingJwtSecret);
            }
            if self.database.url.is_none() {
                return Err(ConfigError::MissingDatabaseUrl);
            }
        }
        let hours = self.security.jwt_expiry_hours;
        if hours == 0 || hours > MAX_TOKEN_HOURS as u64 {
            return Err(ConfigError::TokenLifetime(hours));
        }
        let CoachingConfig { default_days_ahead, max_days_ahead } = self.coaching;
        if !(0..=MAX_DAYS_AHEAD_LIMIT).contains(&max_days_ahead) {
            return Err(ConfigError::DaysAheadLimit(max_days_ahead));
        }
        if default_days_ahead < 0 || default_days_ahead > max_days_ahead {
            return Err(ConfigError::InvalidDaysAhead { default: default_days_ahead, max: max_days_ahead });
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_issuer: None,
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            coaching: CoachingConfig {
                default_days_ahead: 7,
                max_days_ahead: 365,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: None,
                jwt_expiry_hours: 24,
            },
            coaching: CoachingConfig {
                default_days_ahead: 7,
                max_days_ahead: 365,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_issuer: None,
                jwt_expiry_hours: 4,
            },
            coaching: CoachingConfig {
                default_days_ahead: 7,
                max_days_ahead: 365,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert!(config.database.url.is_none());
        assert_eq!(config.coaching.default_days_ahead, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret_and_database() {
        let mut config = AppConfig::production();
        assert!(matches!(config.validate(), Err(ConfigError::MissingJwtSecret)));

        config.security.jwt_secret = "s3cret".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingDatabaseUrl)));

        config.database.url = Some("postgres://localhost/reflect".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_days_ahead_bounds() {
        let mut config = AppConfig::development();
        config.coaching.default_days_ahead = 400;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDaysAhead { .. })));

        config.coaching.default_days_ahead = 7;
        config.coaching.max_days_ahead = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::DaysAheadLimit(_))));
    }

    #[test]
    fn test_token_lifetime_bounds() {
        let mut config = AppConfig::development();
        config.security.jwt_expiry_hours = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::TokenLifetime(_))));

        config.security.jwt_expiry_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::TokenLifetime(_))));
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let json = serde_json::to_string(&AppConfig::development()).unwrap();
        assert!(!json.contains("development-secret-change-me"));
    }
}
