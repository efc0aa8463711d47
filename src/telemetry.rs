//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ServerConfig};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured filter when set. Calling this twice
/// is harmless; the second install is ignored.
pub fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match server.log_format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    if result.is_ok() {
        tracing::info!(
            environment = ?server.environment,
            format = ?server.log_format,
            "Tracing initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        let config = ServerConfig {
            log_level: "not a [valid filter".to_string(),
            ..Default::default()
        };
        init_tracing(&config);
        init_tracing(&ServerConfig::default());
    }
}
