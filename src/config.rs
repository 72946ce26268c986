//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::RedisSettings;
use crate::store::DatabaseSettings;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    /// Upper bound on pooled Postgres connections
    pub db_max_connections: u32,
    /// Seconds to wait for a pooled connection before failing the request
    pub db_acquire_timeout_secs: u64,
    pub redis_host: String,
    pub redis_port: u16,
    /// Base reconnect backoff step in milliseconds
    pub redis_retry_factor_ms: u64,
    /// Cap on a single reconnect delay in milliseconds
    pub redis_retry_max_delay_ms: u64,
    /// Reconnect attempts per failed connection
    pub redis_retries: usize,
    pub redis_connect_timeout_ms: u64,
    pub redis_response_timeout_ms: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD` - Postgres
    ///   connection (default: postgres:5432, demo-app, postgres/pwd)
    /// - `DB_MAX_CONNECTIONS` - Pool size (default: 10)
    /// - `DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 5)
    /// - `REDIS_HOST`, `REDIS_PORT` - Redis connection (default: redis:6379)
    /// - `REDIS_RETRY_FACTOR_MS` - Backoff step (default: 50)
    /// - `REDIS_RETRY_MAX_DELAY_MS` - Backoff cap (default: 2000)
    /// - `REDIS_RETRIES` - Reconnect attempts (default: 6)
    /// - `REDIS_CONNECT_TIMEOUT_MS` - Connect timeout (default: 1000)
    /// - `REDIS_RESPONSE_TIMEOUT_MS` - Command timeout (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            db_host: env_or("DB_HOST", defaults.db_host),
            db_port: env_or("DB_PORT", defaults.db_port),
            db_name: env_or("DB_NAME", defaults.db_name),
            db_user: env_or("DB_USER", defaults.db_user),
            db_password: env_or("DB_PASSWORD", defaults.db_password),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_acquire_timeout_secs: env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout_secs,
            ),
            redis_host: env_or("REDIS_HOST", defaults.redis_host),
            redis_port: env_or("REDIS_PORT", defaults.redis_port),
            redis_retry_factor_ms: env_or("REDIS_RETRY_FACTOR_MS", defaults.redis_retry_factor_ms),
            redis_retry_max_delay_ms: env_or(
                "REDIS_RETRY_MAX_DELAY_MS",
                defaults.redis_retry_max_delay_ms,
            ),
            redis_retries: env_or("REDIS_RETRIES", defaults.redis_retries),
            redis_connect_timeout_ms: env_or(
                "REDIS_CONNECT_TIMEOUT_MS",
                defaults.redis_connect_timeout_ms,
            ),
            redis_response_timeout_ms: env_or(
                "REDIS_RESPONSE_TIMEOUT_MS",
                defaults.redis_response_timeout_ms,
            ),
        }
    }

    pub fn database_settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            host: self.db_host.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }

    pub fn redis_settings(&self) -> RedisSettings {
        RedisSettings {
            host: self.redis_host.clone(),
            port: self.redis_port,
            retry_factor_ms: self.redis_retry_factor_ms,
            retry_max_delay_ms: self.redis_retry_max_delay_ms,
            retries: self.redis_retries,
            connect_timeout: Duration::from_millis(self.redis_connect_timeout_ms),
            response_timeout: Duration::from_millis(self.redis_response_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            db_host: "postgres".to_string(),
            db_port: 5432,
            db_name: "demo-app".to_string(),
            db_user: "postgres".to_string(),
            db_password: "pwd".to_string(),
            db_max_connections: 10,
            db_acquire_timeout_secs: 5,
            redis_host: "redis".to_string(),
            redis_port: 6379,
            redis_retry_factor_ms: 50,
            redis_retry_max_delay_ms: 2000,
            redis_retries: 6,
            redis_connect_timeout_ms: 1000,
            redis_response_timeout_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.db_host, "postgres");
        assert_eq!(config.db_name, "demo-app");
        assert_eq!(config.redis_host, "redis");
        assert_eq!(config.redis_retry_factor_ms, 50);
        assert_eq!(config.redis_retry_max_delay_ms, 2000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("DB_HOST");
        env::remove_var("REDIS_PORT");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.db_host, "postgres");
        assert_eq!(config.redis_port, 6379);
    }

    #[test]
    fn test_unparsable_value_falls_back_to_default() {
        env::set_var("DB_MAX_CONNECTIONS", "lots");
        let config = Config::from_env();
        env::remove_var("DB_MAX_CONNECTIONS");

        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_settings_conversion() {
        let config = Config::default();

        let db = config.database_settings();
        assert_eq!(db.port, 5432);
        assert_eq!(db.acquire_timeout, Duration::from_secs(5));

        let redis = config.redis_settings();
        assert_eq!(redis.url(), "redis://redis:6379/");
        assert_eq!(redis.connect_timeout, Duration::from_millis(1000));
    }
}
