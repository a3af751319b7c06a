//! WebSocket subscription endpoint.
//!
//! GET /ws/documents and GET /api/v1/documents/ws
//!
//! Every accepted socket is subscribed to document change events. Text sent
//! by the client is answered with `Received: <text>` so clients can check the
//! channel is alive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tracing::debug;

use crate::kernel::{Connection, ConnectionRegistry, DeliveryError};
use crate::server::app::AxumAppState;

/// Write half of an accepted WebSocket.
pub struct WebSocketConnection {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    open: AtomicBool,
}

impl WebSocketConnection {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
            open: AtomicBool::new(true),
        }
    }
}

/// Marks the socket closed unless the write it guards completes. A write
/// dropped mid-flight (send timeout) leaves the sink in an unknown state.
struct PendingWrite<'a> {
    open: &'a AtomicBool,
    completed: bool,
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.open.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send_text(&self, text: String) -> Result<(), DeliveryError> {
        let mut pending = PendingWrite {
            open: &self.open,
            completed: false,
        };
        let mut sink = self.sink.lock().await;
        let result = sink
            .send(Message::Text(text))
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()));
        pending.completed = result.is_ok();
        result
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut sink = self.sink.lock().await;
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    }
}

pub async fn ws_documents_handler(
    Extension(state): Extension<AxumAppState>,
    ws: WebSocketUpgrade,
) -> Response {
    let notifier = state.server_deps.notifier.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, notifier))
}

async fn handle_socket(socket: WebSocket, notifier: ConnectionRegistry) {
    let (sink, mut stream) = socket.split();
    let id = notifier
        .register(Arc::new(WebSocketConnection::new(sink)))
        .await;

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if notifier
                    .send_direct(id, format!("Received: {text}"))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = id, error = %e, "WebSocket receive failed");
                break;
            }
        }
    }

    notifier.unregister(id).await;
}
