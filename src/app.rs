//! Wiring of configuration, adapters and the listener into a server.

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::adapters::bilibili::BilibiliApiClient;
use crate::adapters::http::{api_router, cors_layer, ListenerAppState};
use crate::adapters::memory::InMemoryHistoryRepository;
use crate::adapters::postgres::{connect_pool, run_migrations, PostgresHistoryRepository};
use crate::adapters::websocket::WebSocketState;
use crate::application::{FailureSink, GiftCatalogService, ListenerPorts, RoomListenerManager};
use crate::config::{AppConfig, ValidationError};
use crate::domain::foundation::DomainError;
use crate::ports::{HistoryRepository, ProfileLookup, UpstreamClient};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("Database setup failed: {0}")]
    Database(#[from] DomainError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// A wired relay: the HTTP router plus the listener behind it.
pub struct RelayApp {
    pub router: Router,
    pub listener: Arc<RoomListenerManager>,
}

/// Builds the relay from configuration around the given upstream client.
pub async fn build(
    config: &AppConfig,
    upstream: Arc<dyn UpstreamClient>,
    failures: FailureSink,
) -> Result<RelayApp, StartupError> {
    config.validate()?;

    let repository: Arc<dyn HistoryRepository> = match &config.database {
        Some(database) => {
            let pool = connect_pool(database).await?;
            if database.run_migrations {
                run_migrations(&pool).await?;
            }
            Arc::new(PostgresHistoryRepository::new(pool))
        }
        None => {
            tracing::warn!("No database configured, history is kept in memory");
            Arc::new(InMemoryHistoryRepository::new())
        }
    };

    let api = Arc::new(BilibiliApiClient::new(config.upstream.api_config())?);
    let profiles = config
        .upstream
        .avatar_backfill
        .then(|| api.clone() as Arc<dyn ProfileLookup>);

    let listener = Arc::new(RoomListenerManager::new(
        ListenerPorts {
            upstream,
            repository: repository.clone(),
            room_info: api.clone(),
            profiles,
        },
        config.listener_settings(),
        failures,
    ));
    let gifts = Arc::new(GiftCatalogService::new(api, repository));

    let router = api_router(
        ListenerAppState::new(listener.clone(), gifts),
        WebSocketState::new(listener.clone())
            .with_outbound_capacity(config.broadcast.outbound_capacity),
        cors_layer(&config.server.cors_origins_list()),
    );

    Ok(RelayApp { router, listener })
}

/// Serves the relay until ctrl-c, then stops the active room.
pub async fn serve(config: AppConfig, upstream: Arc<dyn UpstreamClient>) -> Result<(), StartupError> {
    let addr = config.server.socket_addr()?;
    let app = build(&config, upstream, FailureSink::disabled()).await?;

    let tcp = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Relay listening");

    axum::serve(tcp, app.router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    app.listener.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::upstream::MockUpstreamClient;
    use crate::config::{BroadcastConfig, DatabaseConfig};

    fn config() -> AppConfig {
        AppConfig {
            server: Default::default(),
            database: None,
            upstream: Default::default(),
            broadcast: Default::default(),
            resources: Default::default(),
        }
    }

    #[tokio::test]
    async fn builds_with_in_memory_history() {
        let app = build(&config(), Arc::new(MockUpstreamClient::new()), FailureSink::disabled())
            .await
            .unwrap();
        assert!(app.listener.current_room().await.is_none());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_wiring() {
        let mut config = config();
        config.broadcast = BroadcastConfig {
            outbound_capacity: 0,
            ..Default::default()
        };
        config.database = Some(DatabaseConfig::default());

        let result = build(&config, Arc::new(MockUpstreamClient::new()), FailureSink::disabled()).await;

        assert!(matches!(result, Err(StartupError::Config(_))));
    }
}
