use std::str::FromStr;
use std::time::Duration;

use crate::utils::CircuitBreakerConfig;

// ============================================================================
// Configuration - resolved once from the environment at startup
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

/// Base URL and per-request timeout of a downstream service.
#[derive(Debug, Clone)]
pub struct ServiceClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub jwt_secret: String,
    pub user_service: ServiceClientConfig,
    pub appointment_service: ServiceClientConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup: &lookup };

        let timeout = Duration::from_millis(env.parse_or("CLIENT_TIMEOUT_MS", 3000u64)?);

        Ok(Self {
            database: DatabaseConfig {
                url: env.required("DATABASE_URL")?,
                max_connections: env.parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            http: HttpConfig {
                host: env.get("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: env.parse_or("HTTP_PORT", 8080)?,
            },
            jwt_secret: env.required("JWT_SECRET")?,
            user_service: ServiceClientConfig {
                base_url: env.required_url("USER_SERVICE_URL")?,
                timeout,
            },
            appointment_service: ServiceClientConfig {
                base_url: env.required_url("APPOINTMENT_SERVICE_URL")?,
                timeout,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: env.parse_or("CIRCUIT_FAILURE_THRESHOLD", 5)?,
                reset_timeout: Duration::from_secs(env.parse_or("CIRCUIT_RESET_SECS", 30)?),
            },
            run_migrations: env.parse_or("RUN_MIGRATIONS", true)?,
        })
    }
}

struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn required_url(&self, key: &'static str) -> Result<String, ConfigError> {
        Ok(self.required(key)?.trim_end_matches('/').to_string())
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
        }
    }
}
