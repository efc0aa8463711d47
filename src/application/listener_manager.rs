//! Room listener manager - composition root of the listening pipeline.
//!
//! Every upstream event of the active session is normalized once, then:
//!
//! 1. broadcast to the room's subscribers;
//! 2. for authenticated sessions only, written to history by its own
//!    spawned task.
//!
//! Persistence failures never reach subscribers or the event pump. They are
//! logged and reported on the [`FailureSink`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::{ConnectionId, Credential, RoomId, Timestamp};
use crate::domain::live::{
    EventKind, EventNormalizer, HistoryRecord, MembershipSkinTable, RoomRecord, UpstreamEvent,
};
use crate::ports::{
    HistoryRepository, ProfileLookup, RoomInfoProvider, SubscriberConnection, UpstreamClient,
};

use super::avatar_backfill::AvatarBackfill;
use super::errors::{FailureSink, ListenerError, ListenerFailure};
use super::metadata_fetcher::RoomMetadataFetcher;
use super::room_client_registry::{
    RoomClientRegistry, RoomEventSink, SessionContext, SessionEnd, StartOutcome,
};
use super::subscriber_registry::SubscriberRegistry;

/// External collaborators of the listener.
#[derive(Clone)]
pub struct ListenerPorts {
    pub upstream: Arc<dyn UpstreamClient>,
    pub repository: Arc<dyn HistoryRepository>,
    pub room_info: Arc<dyn RoomInfoProvider>,
    /// Avatar backfill is skipped when absent.
    pub profiles: Option<Arc<dyn ProfileLookup>>,
}

/// Tunables of the listener.
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub send_timeout: Duration,
    pub drain_timeout: Duration,
    pub metadata_timeout: Duration,
    pub profile_timeout: Duration,
    pub skins: MembershipSkinTable,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            send_timeout: SubscriberRegistry::DEFAULT_SEND_TIMEOUT,
            drain_timeout: RoomClientRegistry::DEFAULT_DRAIN_TIMEOUT,
            metadata_timeout: Duration::from_secs(5),
            profile_timeout: Duration::from_secs(3),
            skins: MembershipSkinTable::default(),
        }
    }
}

/// Routes normalized events to broadcast and write-through persistence.
struct EventRouter {
    normalizer: EventNormalizer,
    subscribers: Arc<SubscriberRegistry>,
    repository: Arc<dyn HistoryRepository>,
    avatars: Option<AvatarBackfill>,
    failures: FailureSink,
}

impl EventRouter {
    fn persist(&self, room_id: RoomId, record: HistoryRecord) {
        let repository = Arc::clone(&self.repository);
        let failures = self.failures.clone();

        tokio::spawn(async move {
            let table = record.table();
            match repository.insert(&record).await {
                Ok(()) => tracing::debug!(room_id = %room_id, table, "Event persisted"),
                Err(error) => {
                    tracing::error!(room_id = %room_id, table, error = %error, "Failed to persist event");
                    failures.report(ListenerFailure::Persistence {
                        room_id,
                        table,
                        error,
                    });
                }
            }
        });
    }
}

#[async_trait]
impl RoomEventSink for EventRouter {
    async fn on_event(&self, session: &SessionContext, event: UpstreamEvent) {
        let room_id = session.room_id;

        let mut canonical = match self.normalizer.normalize(room_id, &event, Timestamp::now()) {
            Ok(canonical) => canonical,
            Err(error) => {
                tracing::warn!(room_id = %room_id, error = %error, "Dropping malformed upstream event");
                self.failures
                    .report(ListenerFailure::Normalize { room_id, error });
                return;
            }
        };

        if canonical.kind == EventKind::PaidMessage {
            if let Some(avatars) = &self.avatars {
                if let Err(error) = avatars.fill(&mut canonical, session.credential.as_ref()).await {
                    tracing::debug!(room_id = %room_id, error = %error, "Avatar backfill failed");
                    self.failures
                        .report(ListenerFailure::ProfileLookup { room_id, error });
                }
            }
        }

        match canonical.to_json() {
            Ok(payload) => {
                let report = self.subscribers.broadcast(room_id, &payload).await;
                for (connection_id, error) in report.evicted {
                    self.failures.report(ListenerFailure::Delivery {
                        room_id,
                        connection_id,
                        error,
                    });
                }
            }
            Err(error) => {
                tracing::error!(room_id = %room_id, error = %error, "Failed to serialize event");
            }
        }

        if session.is_authenticated() {
            self.persist(room_id, HistoryRecord::from_event(&canonical));
        }
    }

    async fn on_session_closed(&self, room_id: RoomId, end: SessionEnd) {
        if end == SessionEnd::UpstreamClosed {
            self.failures
                .report(ListenerFailure::UpstreamClosed { room_id });
        }
        // Nothing will arrive for these subscribers any more.
        self.subscribers.close_room(room_id).await;
    }
}

/// Control surface for listening to a room and serving its subscribers.
pub struct RoomListenerManager {
    rooms: RoomClientRegistry,
    subscribers: Arc<SubscriberRegistry>,
    metadata: Arc<RoomMetadataFetcher>,
    failures: FailureSink,
}

impl RoomListenerManager {
    pub fn new(ports: ListenerPorts, settings: ListenerSettings, failures: FailureSink) -> Self {
        let subscribers = Arc::new(SubscriberRegistry::new(settings.send_timeout));

        let router = EventRouter {
            normalizer: EventNormalizer::new(settings.skins),
            subscribers: Arc::clone(&subscribers),
            repository: Arc::clone(&ports.repository),
            avatars: ports
                .profiles
                .map(|profiles| AvatarBackfill::new(profiles, settings.profile_timeout)),
            failures: failures.clone(),
        };

        let rooms = RoomClientRegistry::new(ports.upstream, Arc::new(router))
            .with_drain_timeout(settings.drain_timeout);

        let metadata = Arc::new(RoomMetadataFetcher::new(
            ports.room_info,
            ports.repository,
            settings.metadata_timeout,
        ));

        Self {
            rooms,
            subscribers,
            metadata,
            failures,
        }
    }

    /// Starts listening to `room_id` and resolves its metadata.
    ///
    /// Returns the room record once resolved, or `None` when resolution
    /// failed; that never fails the listen. A listen without credential is
    /// anonymous and never persisted.
    pub async fn start_listening(
        &self,
        room_id: RoomId,
        credential: Option<Credential>,
    ) -> Result<Option<RoomRecord>, ListenerError> {
        let metadata_credential = credential.clone();
        self.rooms.start_listening(room_id, credential).await?;

        Ok(self.resolve_metadata(room_id, metadata_credential.as_ref()).await)
    }

    /// Stops `room_id`, or whatever is active when `None`.
    ///
    /// Returns the room that was stopped.
    pub async fn stop_listening(&self, room_id: Option<RoomId>) -> Option<RoomId> {
        match room_id {
            Some(room_id) => self
                .rooms
                .stop_listening(room_id)
                .await
                .then_some(room_id),
            None => self.rooms.stop_active().await,
        }
    }

    /// Ensures `room_id` is listened to, then registers `connection`.
    ///
    /// An already active session for the room is kept as is, credential
    /// included. Otherwise an anonymous session is started, replacing any
    /// other room. Registration happens before the room slot is released,
    /// so a concurrent stop always closes the new subscriber.
    pub async fn join(
        &self,
        room_id: RoomId,
        connection: Arc<dyn SubscriberConnection>,
    ) -> Result<(), ListenerError> {
        let (outcome, slot) = self.rooms.start_and_hold(room_id, None).await?;
        self.subscribers.join(room_id, connection).await;
        drop(slot);

        if let StartOutcome::Started { .. } = outcome {
            let metadata = Arc::clone(&self.metadata);
            let failures = self.failures.clone();
            tokio::spawn(async move {
                if let Err(err) = metadata.fetch_and_store(room_id, None).await {
                    failures.report(ListenerFailure::Metadata {
                        room_id,
                        reason: err.to_string(),
                    });
                }
            });
        }

        Ok(())
    }

    /// Removes a subscriber. No-op when it is not registered.
    pub async fn leave(&self, room_id: RoomId, connection_id: ConnectionId) -> bool {
        self.subscribers.leave(room_id, connection_id).await
    }

    pub async fn current_room(&self) -> Option<RoomId> {
        self.rooms.current_room().await
    }

    pub async fn subscriber_count(&self, room_id: RoomId) -> usize {
        self.subscribers.subscriber_count(room_id).await
    }

    /// Stops the active room, if any.
    pub async fn shutdown(&self) {
        if let Some(room_id) = self.rooms.stop_active().await {
            tracing::info!(room_id = %room_id, "Listener shut down");
        }
    }

    async fn resolve_metadata(
        &self,
        room_id: RoomId,
        credential: Option<&Credential>,
    ) -> Option<RoomRecord> {
        match self.metadata.fetch_and_store(room_id, credential).await {
            Ok(record) => Some(record),
            Err(err) => {
                self.failures.report(ListenerFailure::Metadata {
                    room_id,
                    reason: err.to_string(),
                });
                err.resolved_record().cloned()
            }
        }
    }
}
