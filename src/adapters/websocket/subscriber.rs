//! Queue-backed subscriber connection.
//!
//! Broadcasts push frames onto a bounded per-connection queue; a writer
//! task owned by the transport drains it onto the socket. A full queue
//! makes `send` wait, and the registry's per-send timeout turns a viewer
//! that stopped reading into an eviction.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use crate::domain::foundation::ConnectionId;
use crate::ports::{DeliveryError, SubscriberConnection};

/// One frame for the writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close,
}

pub struct QueuedSubscriber {
    id: ConnectionId,
    tx: mpsc::Sender<OutboundFrame>,
    closed: AtomicBool,
}

impl QueuedSubscriber {
    /// Creates a subscriber and the receiving end of its queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let subscriber = Self {
            id: ConnectionId::new(),
            tx,
            closed: AtomicBool::new(false),
        };
        (subscriber, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriberConnection for QueuedSubscriber {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: &str) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        self.tx
            .send(OutboundFrame::Text(payload.to_string()))
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // A full queue still gets its close frame, behind the queued texts.
        if let Err(mpsc::error::TrySendError::Full(frame)) =
            self.tx.try_send(OutboundFrame::Close)
        {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(frame).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_arrive_in_order_then_close() {
        let (subscriber, mut rx) = QueuedSubscriber::new(4);

        subscriber.send("a").await.unwrap();
        subscriber.send("b").await.unwrap();
        subscriber.close().await;
        subscriber.close().await;

        assert_eq!(rx.recv().await, Some(OutboundFrame::Text("a".into())));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Text("b".into())));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Close));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn close_on_full_queue_lands_after_pending_frames() {
        let (subscriber, mut rx) = QueuedSubscriber::new(2);

        subscriber.send("first").await.unwrap();
        subscriber.send("second").await.unwrap();
        subscriber.close().await;

        assert_eq!(rx.recv().await, Some(OutboundFrame::Text("first".into())));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Text("second".into())));
        let last = tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("close frame queued");
        assert_eq!(last, Some(OutboundFrame::Close));
    }

    #[tokio::test]
    async fn send_after_close_fails() {
        let (subscriber, _rx) = QueuedSubscriber::new(4);
        subscriber.close().await;

        assert_eq!(subscriber.send("late").await, Err(DeliveryError::Closed));
    }

    #[tokio::test]
    async fn send_fails_once_writer_is_gone() {
        let (subscriber, rx) = QueuedSubscriber::new(4);
        drop(rx);

        assert_eq!(subscriber.send("x").await, Err(DeliveryError::Closed));
    }
}
