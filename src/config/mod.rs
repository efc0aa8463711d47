//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `DANMAKU_RELAY` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use danmaku_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod broadcast;
mod database;
mod error;
mod resources;
mod server;
mod upstream;

pub use broadcast::BroadcastConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use resources::ResourcesConfig;
pub use server::{Environment, LogFormat, ServerConfig};
pub use upstream::UpstreamConfig;

use serde::Deserialize;

use crate::application::ListenerSettings;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// History database. Without one, history is kept in memory.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub broadcast: BroadcastConfig,

    #[serde(default)]
    pub resources: ResourcesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DANMAKU_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DANMAKU_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DANMAKU_RELAY__DATABASE__URL=...` -> `database.url = ...`
    /// - `DANMAKU_RELAY__BROADCAST__SEND_TIMEOUT_MS=2000`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DANMAKU_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.upstream.validate()?;
        self.broadcast.validate()?;
        Ok(())
    }

    /// Listener tunables derived from the broadcast and resource sections.
    pub fn listener_settings(&self) -> ListenerSettings {
        ListenerSettings {
            send_timeout: self.broadcast.send_timeout(),
            drain_timeout: self.broadcast.drain_timeout(),
            metadata_timeout: self.broadcast.metadata_timeout(),
            profile_timeout: self.broadcast.profile_timeout(),
            skins: self.resources.skin_table(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "DANMAKU_RELAY__DATABASE__URL",
        "DANMAKU_RELAY__SERVER__PORT",
        "DANMAKU_RELAY__SERVER__ENVIRONMENT",
        "DANMAKU_RELAY__BROADCAST__SEND_TIMEOUT_MS",
        "DANMAKU_RELAY__RESOURCES__GUARD_CAPTAIN",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_without_database_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.server.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DANMAKU_RELAY__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("DANMAKU_RELAY__SERVER__PORT", "3000");
        env::set_var("DANMAKU_RELAY__BROADCAST__SEND_TIMEOUT_MS", "1500");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.database.as_ref().map(|d| d.url.as_str()),
            Some("postgresql://test@localhost/test")
        );
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.broadcast.send_timeout(), Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DANMAKU_RELAY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_listener_settings_follow_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DANMAKU_RELAY__RESOURCES__GUARD_CAPTAIN", "https://cdn/captain.png");
        let result = AppConfig::load();
        clear_env();

        let settings = result.unwrap().listener_settings();
        assert_eq!(settings.send_timeout, Duration::from_secs(5));
        assert_eq!(
            settings.skins.resolve(crate::domain::live::PrivilegeTier::Captain),
            "https://cdn/captain.png"
        );
    }
}
