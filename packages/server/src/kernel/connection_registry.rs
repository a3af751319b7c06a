//! Live subscriber connections and best-effort fan-out.
//!
//! The registry owns every accepted connection until it is unregistered,
//! either explicitly (client closed) or because a write to it failed.
//! Callers refer to connections by [`ConnectionId`] only.
//!
//! `broadcast` snapshots the live set under a read lock, releases the lock,
//! then writes to each member in turn. Register and unregister can run while
//! a broadcast is in flight: a connection added mid-broadcast may miss that
//! message, and a failed member is removed after its own write without
//! affecting delivery to the others.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Default bound on a single write.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

pub type ConnectionId = u64;

/// Why a message could not be written to a connection.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,

    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no such connection: {0}")]
    UnknownConnection(ConnectionId),
}

/// Write half of a subscriber channel.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send_text(&self, text: String) -> Result<(), DeliveryError>;

    /// Liveness flag. Connections known to be closed are dropped without a
    /// write attempt.
    fn is_open(&self) -> bool {
        true
    }

    /// Best-effort close handshake.
    async fn close(&self) {}
}

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

struct Inner {
    connections: RwLock<HashMap<ConnectionId, Arc<dyn Connection>>>,
    next_id: AtomicU64,
    send_timeout: Duration,
}

/// Registry of live connections. Cheap to clone; clones share the same set.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_send_timeout(DEFAULT_SEND_TIMEOUT)
    }

    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                connections: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                send_timeout,
            }),
        }
    }

    /// Add an accepted connection to the live set.
    pub async fn register(&self, connection: Arc<dyn Connection>) -> ConnectionId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let total = {
            let mut connections = self.inner.connections.write().await;
            connections.insert(id, connection);
            connections.len()
        };
        info!(connection_id = id, total, "Subscriber connected");
        id
    }

    /// Remove a connection. Removing an absent connection is a no-op.
    ///
    /// Returns whether the connection was still registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.inner.connections.write().await;
            let removed = connections.remove(&id);
            (removed, connections.len())
        };

        match removed {
            Some(connection) => {
                if tokio::time::timeout(self.inner.send_timeout, connection.close())
                    .await
                    .is_err()
                {
                    debug!(connection_id = id, "Close handshake timed out");
                }
                info!(connection_id = id, total, "Subscriber disconnected");
                true
            }
            None => false,
        }
    }

    /// Deliver `message` to every connection live at call time.
    ///
    /// Failed connections are unregistered; failures never reach the caller.
    pub async fn broadcast(&self, message: &str) -> BroadcastReport {
        let snapshot: Vec<(ConnectionId, Arc<dyn Connection>)> = {
            let connections = self.inner.connections.read().await;
            connections
                .iter()
                .map(|(id, connection)| (*id, connection.clone()))
                .collect()
        };

        let mut report = BroadcastReport::default();
        for (id, connection) in snapshot {
            match self.deliver(connection.as_ref(), message.to_string()).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(connection_id = id, error = %e, "Dropping subscriber after failed send");
                    self.unregister(id).await;
                    report.dropped += 1;
                }
            }
        }

        debug!(
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast complete"
        );
        report
    }

    /// Serialize `event` as JSON and broadcast it.
    pub async fn broadcast_event<T: Serialize>(&self, event: &T) -> BroadcastReport {
        match serde_json::to_string(event) {
            Ok(message) => self.broadcast(&message).await,
            Err(e) => {
                warn!(error = %e, "Failed to serialize broadcast event");
                BroadcastReport::default()
            }
        }
    }

    /// Write to a single connection. A failed write unregisters it.
    pub async fn send_direct(&self, id: ConnectionId, message: String) -> Result<(), DeliveryError> {
        let connection = self
            .inner
            .connections
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DeliveryError::UnknownConnection(id))?;

        if let Err(e) = self.deliver(connection.as_ref(), message).await {
            warn!(connection_id = id, error = %e, "Direct send failed, dropping subscriber");
            self.unregister(id).await;
            return Err(e);
        }
        Ok(())
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.connections.read().await.len()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.inner.connections.read().await.contains_key(&id)
    }

    /// Close and drop every connection (shutdown).
    pub async fn close_all(&self) {
        let drained: Vec<Arc<dyn Connection>> = {
            let mut connections = self.inner.connections.write().await;
            connections.drain().map(|(_, connection)| connection).collect()
        };
        for connection in &drained {
            let _ = tokio::time::timeout(self.inner.send_timeout, connection.close()).await;
        }
        info!(closed = drained.len(), "Closed all subscriber connections");
    }

    async fn deliver(&self, connection: &dyn Connection, message: String) -> Result<(), DeliveryError> {
        if !connection.is_open() {
            return Err(DeliveryError::Closed);
        }

        tokio::time::timeout(self.inner.send_timeout, connection.send_text(message))
            .await
            .map_err(|_| DeliveryError::Timeout(self.inner.send_timeout))?
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection backed by an in-process channel.
///
/// The write fails once the receiving side has been dropped.
pub struct ChannelConnection {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelConnection {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn send_text(&self, text: String) -> Result<(), DeliveryError> {
        self.tx.send(text).map_err(|_| DeliveryError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
