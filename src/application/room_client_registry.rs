//! Room client registry - the single active upstream room session.
//!
//! At most one room is listened to per process. Starting a different room
//! fully tears down the active one first, and every start/stop runs under
//! one async mutex so two sessions never coexist, not even transiently.
//!
//! # Session lifecycle
//!
//! ```text
//! start_listening(A) ──► connect ──► pump task ──► sink.on_event(..)
//!                                       │
//! stop / supersede / stream end ────────┴──► disconnect ──► drain pump
//!                                                       ──► sink.on_session_closed
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::domain::foundation::{Credential, RoomId};
use crate::domain::live::UpstreamEvent;
use crate::ports::{UpstreamClient, UpstreamHandle};

use super::errors::ListenerError;

/// The session an upstream event arrived on.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub room_id: RoomId,
    /// `None` for anonymous listens.
    pub credential: Option<Credential>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Stopped,
    Superseded,
    UpstreamClosed,
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The room was already being listened to; nothing changed.
    AlreadyActive,
    /// A new session was opened, possibly replacing another room.
    Started { superseded: Option<RoomId> },
}

/// Receives everything a live session produces.
#[async_trait]
pub trait RoomEventSink: Send + Sync {
    /// Called once per upstream event, in arrival order.
    async fn on_event(&self, session: &SessionContext, event: UpstreamEvent);

    /// Called once after a session's upstream handle is disconnected.
    async fn on_session_closed(&self, room_id: RoomId, end: SessionEnd);
}

struct RoomSession {
    context: SessionContext,
    generation: u64,
    handle: Box<dyn UpstreamHandle>,
    shutdown: Option<oneshot::Sender<()>>,
    pump: JoinHandle<()>,
}

impl RoomSession {
    fn is_alive(&self) -> bool {
        !self.pump.is_finished()
    }
}

type ActiveSlot = Arc<Mutex<Option<RoomSession>>>;

/// Holds the active slot locked. See [`RoomClientRegistry::start_and_hold`].
pub struct SlotGuard<'a> {
    _slot: MutexGuard<'a, Option<RoomSession>>,
}

/// Owner of the active upstream room session.
pub struct RoomClientRegistry {
    client: Arc<dyn UpstreamClient>,
    sink: Arc<dyn RoomEventSink>,
    active: ActiveSlot,
    next_generation: AtomicU64,
    drain_timeout: Duration,
}

impl RoomClientRegistry {
    pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(client: Arc<dyn UpstreamClient>, sink: Arc<dyn RoomEventSink>) -> Self {
        Self {
            client,
            sink,
            active: Arc::new(Mutex::new(None)),
            next_generation: AtomicU64::new(1),
            drain_timeout: Self::DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bounds how long a stop waits for the in-flight event to finish.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Starts listening to `room_id`.
    ///
    /// Idempotent while the room's session is alive. Any other active room
    /// is stopped first. On connect failure the registry is left without
    /// an active session.
    pub async fn start_listening(
        &self,
        room_id: RoomId,
        credential: Option<Credential>,
    ) -> Result<StartOutcome, ListenerError> {
        let (outcome, _slot) = self.start_and_hold(room_id, credential).await?;
        Ok(outcome)
    }

    /// Like [`Self::start_listening`], but keeps the slot locked until the
    /// returned guard drops. No stop or supersede can run in between, so
    /// work done under the guard sees the session it just started.
    pub async fn start_and_hold(
        &self,
        room_id: RoomId,
        credential: Option<Credential>,
    ) -> Result<(StartOutcome, SlotGuard<'_>), ListenerError> {
        let mut slot = self.active.lock().await;
        let outcome = self.start_locked(&mut slot, room_id, credential).await?;
        Ok((outcome, SlotGuard { _slot: slot }))
    }

    async fn start_locked(
        &self,
        slot: &mut Option<RoomSession>,
        room_id: RoomId,
        credential: Option<Credential>,
    ) -> Result<StartOutcome, ListenerError> {
        if let Some(session) = slot.as_ref() {
            if session.context.room_id == room_id && session.is_alive() {
                tracing::debug!(room_id = %room_id, "Room already active");
                return Ok(StartOutcome::AlreadyActive);
            }
        }

        let mut superseded = None;
        if let Some(previous) = slot.take() {
            let end = if previous.context.room_id == room_id {
                SessionEnd::UpstreamClosed
            } else {
                superseded = Some(previous.context.room_id);
                SessionEnd::Superseded
            };
            teardown(previous, &self.sink, end, self.drain_timeout).await;
        }

        let connection = self
            .client
            .connect(room_id, credential.as_ref())
            .await
            .map_err(|source| ListenerError::upstream(room_id, source))?;

        let context = SessionContext {
            room_id,
            credential,
        };
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let pump = tokio::spawn(pump_events(
            context.clone(),
            connection.events,
            shutdown_rx,
            Arc::clone(&self.sink),
            Arc::clone(&self.active),
            generation,
            self.drain_timeout,
        ));

        tracing::info!(
            room_id = %room_id,
            authenticated = context.is_authenticated(),
            "Listening to room"
        );

        *slot = Some(RoomSession {
            context,
            generation,
            handle: connection.handle,
            shutdown: Some(shutdown_tx),
            pump,
        });

        Ok(StartOutcome::Started { superseded })
    }

    /// Stops `room_id` if it is the active room. Returns false otherwise.
    pub async fn stop_listening(&self, room_id: RoomId) -> bool {
        let mut slot = self.active.lock().await;
        if slot.as_ref().map(|s| s.context.room_id) != Some(room_id) {
            tracing::debug!(room_id = %room_id, "Stop ignored, room not active");
            return false;
        }
        if let Some(session) = slot.take() {
            teardown(session, &self.sink, SessionEnd::Stopped, self.drain_timeout).await;
        }
        true
    }

    /// Stops whatever room is active and returns it.
    pub async fn stop_active(&self) -> Option<RoomId> {
        let mut slot = self.active.lock().await;
        let session = slot.take()?;
        let room_id = session.context.room_id;
        teardown(session, &self.sink, SessionEnd::Stopped, self.drain_timeout).await;
        Some(room_id)
    }

    pub async fn current_room(&self) -> Option<RoomId> {
        self.active.lock().await.as_ref().map(|s| s.context.room_id)
    }
}

async fn pump_events(
    context: SessionContext,
    mut events: mpsc::Receiver<UpstreamEvent>,
    mut shutdown: oneshot::Receiver<()>,
    sink: Arc<dyn RoomEventSink>,
    active: ActiveSlot,
    generation: u64,
    drain_timeout: Duration,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::debug!(room_id = %context.room_id, "Event pump stopped");
                return;
            }
            next = events.recv() => match next {
                Some(event) => sink.on_event(&context, event).await,
                None => break,
            },
        }
    }

    tracing::warn!(room_id = %context.room_id, "Upstream event stream ended");

    // Tear down from a separate task: teardown awaits this pump.
    tokio::spawn(async move {
        let mut slot = active.lock().await;
        if slot.as_ref().map(|s| s.generation) != Some(generation) {
            return;
        }
        if let Some(session) = slot.take() {
            teardown(session, &sink, SessionEnd::UpstreamClosed, drain_timeout).await;
        }
    });
}

async fn teardown(
    mut session: RoomSession,
    sink: &Arc<dyn RoomEventSink>,
    end: SessionEnd,
    drain_timeout: Duration,
) {
    let room_id = session.context.room_id;

    if let Some(shutdown) = session.shutdown.take() {
        let _ = shutdown.send(());
    }
    session.handle.disconnect().await;

    if tokio::time::timeout(drain_timeout, &mut session.pump)
        .await
        .is_err()
    {
        tracing::warn!(room_id = %room_id, "Event pump did not drain in time, aborting");
        session.pump.abort();
    }

    sink.on_session_closed(room_id, end).await;
    tracing::info!(room_id = %room_id, reason = ?end, "Room session closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::live::ChatMessage;
    use crate::ports::{UpstreamConnection, UpstreamError};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeClientState {
        connects: Vec<(RoomId, bool)>,
        disconnects: HashMap<RoomId, usize>,
        senders: HashMap<RoomId, mpsc::Sender<UpstreamEvent>>,
        fail_next: bool,
    }

    #[derive(Default, Clone)]
    struct FakeClient {
        state: Arc<StdMutex<FakeClientState>>,
    }

    struct FakeHandle {
        room_id: RoomId,
        state: Arc<StdMutex<FakeClientState>>,
    }

    #[async_trait]
    impl UpstreamHandle for FakeHandle {
        async fn disconnect(&mut self) {
            let mut state = self.state.lock().unwrap();
            *state.disconnects.entry(self.room_id).or_default() += 1;
            state.senders.remove(&self.room_id);
        }
    }

    #[async_trait]
    impl UpstreamClient for FakeClient {
        async fn connect(
            &self,
            room_id: RoomId,
            credential: Option<&Credential>,
        ) -> Result<UpstreamConnection, UpstreamError> {
            let mut state = self.state.lock().unwrap();
            if std::mem::take(&mut state.fail_next) {
                return Err(UpstreamError::Connect("refused".into()));
            }
            state.connects.push((room_id, credential.is_some()));
            let (tx, rx) = mpsc::channel(16);
            state.senders.insert(room_id, tx);
            Ok(UpstreamConnection {
                events: rx,
                handle: Box::new(FakeHandle {
                    room_id,
                    state: Arc::clone(&self.state),
                }),
            })
        }
    }

    impl FakeClient {
        fn sender(&self, room_id: RoomId) -> Option<mpsc::Sender<UpstreamEvent>> {
            self.state.lock().unwrap().senders.get(&room_id).cloned()
        }

        fn drop_sender(&self, room_id: RoomId) {
            self.state.lock().unwrap().senders.remove(&room_id);
        }

        fn disconnects(&self, room_id: RoomId) -> usize {
            self.state
                .lock()
                .unwrap()
                .disconnects
                .get(&room_id)
                .copied()
                .unwrap_or(0)
        }

        fn connect_count(&self) -> usize {
            self.state.lock().unwrap().connects.len()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<(RoomId, bool, String)>>,
        closed: StdMutex<Vec<(RoomId, SessionEnd)>>,
    }

    #[async_trait]
    impl RoomEventSink for RecordingSink {
        async fn on_event(&self, session: &SessionContext, event: UpstreamEvent) {
            let text = match event {
                UpstreamEvent::Chat(chat) => chat.msg,
                other => other.kind_name().to_string(),
            };
            self.events
                .lock()
                .unwrap()
                .push((session.room_id, session.is_authenticated(), text));
        }

        async fn on_session_closed(&self, room_id: RoomId, end: SessionEnd) {
            self.closed.lock().unwrap().push((room_id, end));
        }
    }

    fn room(id: u64) -> RoomId {
        RoomId::new(id).unwrap()
    }

    fn chat(text: &str) -> UpstreamEvent {
        UpstreamEvent::Chat(ChatMessage {
            uname: "viewer".into(),
            msg: text.into(),
            ..Default::default()
        })
    }

    fn setup() -> (RoomClientRegistry, FakeClient, Arc<RecordingSink>) {
        let client = FakeClient::default();
        let sink = Arc::new(RecordingSink::default());
        let registry = RoomClientRegistry::new(Arc::new(client.clone()), sink.clone())
            .with_drain_timeout(Duration::from_secs(1));
        (registry, client, sink)
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn start_is_idempotent_for_active_room() {
        let (registry, client, _) = setup();

        let first = registry.start_listening(room(1), None).await.unwrap();
        let second = registry.start_listening(room(1), None).await.unwrap();

        assert_eq!(first, StartOutcome::Started { superseded: None });
        assert_eq!(second, StartOutcome::AlreadyActive);
        assert_eq!(client.connect_count(), 1);
        assert_eq!(registry.current_room().await, Some(room(1)));
    }

    #[tokio::test]
    async fn starting_other_room_stops_previous_exactly_once() {
        let (registry, client, sink) = setup();
        registry.start_listening(room(1), None).await.unwrap();

        let outcome = registry.start_listening(room(2), None).await.unwrap();

        assert_eq!(outcome, StartOutcome::Started { superseded: Some(room(1)) });
        assert_eq!(client.disconnects(room(1)), 1);
        assert_eq!(client.disconnects(room(2)), 0);
        assert_eq!(registry.current_room().await, Some(room(2)));
        assert_eq!(
            *sink.closed.lock().unwrap(),
            vec![(room(1), SessionEnd::Superseded)]
        );
    }

    #[tokio::test]
    async fn connect_failure_leaves_no_active_session() {
        let (registry, client, _) = setup();
        registry.start_listening(room(1), None).await.unwrap();
        client.state.lock().unwrap().fail_next = true;

        let result = registry.start_listening(room(2), None).await;

        assert!(matches!(result, Err(ListenerError::Upstream { .. })));
        assert_eq!(registry.current_room().await, None);
        assert_eq!(client.disconnects(room(1)), 1);
    }

    #[tokio::test]
    async fn stop_ignores_inactive_room() {
        let (registry, client, sink) = setup();
        registry.start_listening(room(1), None).await.unwrap();

        assert!(!registry.stop_listening(room(2)).await);
        assert_eq!(registry.current_room().await, Some(room(1)));

        assert!(registry.stop_listening(room(1)).await);
        assert_eq!(registry.current_room().await, None);
        assert_eq!(client.disconnects(room(1)), 1);
        assert_eq!(
            *sink.closed.lock().unwrap(),
            vec![(room(1), SessionEnd::Stopped)]
        );
    }

    #[tokio::test]
    async fn stop_active_returns_stopped_room() {
        let (registry, _, _) = setup();
        assert_eq!(registry.stop_active().await, None);

        registry.start_listening(room(3), None).await.unwrap();
        assert_eq!(registry.stop_active().await, Some(room(3)));
        assert_eq!(registry.current_room().await, None);
    }

    #[tokio::test]
    async fn events_reach_sink_in_order_with_session_context() {
        let (registry, client, sink) = setup();
        let credential = Credential::new("token");
        registry.start_listening(room(1), credential).await.unwrap();

        let tx = client.sender(room(1)).unwrap();
        tx.send(chat("one")).await.unwrap();
        tx.send(chat("two")).await.unwrap();

        wait_for(|| sink.events.lock().unwrap().len() == 2).await;
        let events = sink.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                (room(1), true, "one".to_string()),
                (room(1), true, "two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn upstream_stream_end_clears_session() {
        let (registry, client, sink) = setup();
        registry.start_listening(room(1), None).await.unwrap();

        client.drop_sender(room(1));

        wait_for(|| !sink.closed.lock().unwrap().is_empty()).await;
        assert_eq!(registry.current_room().await, None);
        assert_eq!(client.disconnects(room(1)), 1);
        assert_eq!(
            *sink.closed.lock().unwrap(),
            vec![(room(1), SessionEnd::UpstreamClosed)]
        );
    }

    #[tokio::test]
    async fn concurrent_starts_keep_single_session() {
        let (registry, client, _) = setup();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (1..=5)
            .map(|id| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.start_listening(room(id), None).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let active = registry.current_room().await.unwrap();
        let total_disconnects: usize = (1..=5).map(|id| client.disconnects(room(id))).sum();
        assert_eq!(client.connect_count(), 5);
        assert_eq!(total_disconnects, 4);
        assert_eq!(client.disconnects(active), 0);
    }
}
