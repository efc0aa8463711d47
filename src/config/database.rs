//! History database settings.
//!
//! Every normalized event of an authenticated session is written by its own
//! task, and each write holds a pooled connection for one short transaction.
//! The pool bounds how many of those writes run at once; a write that cannot
//! get a connection within `acquire_timeout_ms` fails and is reported.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,

    /// Connections kept open while the relay is idle
    #[serde(default)]
    pub min_connections: u32,

    /// Upper bound on concurrent history writes
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,

    /// Idle connections above `min_connections` close after this long
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,

    /// Apply the embedded schema on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        if self.acquire_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout("database.acquire_timeout_ms"));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 0,
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout(),
            idle_timeout_ms: default_idle_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_max_connections() -> u32 {
    8
}

fn default_acquire_timeout() -> u64 {
    3_000
}

fn default_idle_timeout() -> u64 {
    300_000
}

fn default_run_migrations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_validate_once_url_is_set() {
        let config = postgres("postgres://relay@localhost/danmaku");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(3));
        assert_eq!(config.idle_timeout(), Duration::from_secs(300));
        assert!(config.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_url_is_missing() {
        assert!(matches!(
            postgres("  ").validate(),
            Err(ValidationError::MissingRequired("database.url"))
        ));
    }

    #[test]
    fn test_non_postgres_url_is_rejected() {
        assert!(matches!(
            postgres("sqlite://history.db").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn test_pool_without_connections_is_rejected() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..postgres("postgresql://localhost/danmaku")
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPoolSize { min: 0, max: 0 })
        ));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let config = DatabaseConfig {
            min_connections: 4,
            max_connections: 2,
            ..postgres("postgresql://localhost/danmaku")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_acquire_timeout_is_rejected() {
        let config = DatabaseConfig {
            acquire_timeout_ms: 0,
            ..postgres("postgresql://localhost/danmaku")
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("database.acquire_timeout_ms"))
        ));
    }
}
