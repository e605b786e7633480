//! WebSocket support for live catalog updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use ftpflix_core::{SearchResult, StoreEvent};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A catalog load started.
    LoadStarted,
    /// The manifest arrived.
    CategoriesLoaded { count: usize },
    /// A new collection snapshot is available; clients should refetch.
    ContentUpdated { version: u64, total: usize },
    LoadFinished {
        total: usize,
        failed_categories: Vec<String>,
    },
    LoadFailed { error: String },
    /// Results for a search that was issued before content was available.
    SearchResolved {
        query: String,
        results: Vec<SearchResult>,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::LoadStarted => "load_started",
            WsMessage::CategoriesLoaded { .. } => "categories_loaded",
            WsMessage::ContentUpdated { .. } => "content_updated",
            WsMessage::LoadFinished { .. } => "load_finished",
            WsMessage::LoadFailed { .. } => "load_failed",
            WsMessage::SearchResolved { .. } => "search_resolved",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

impl From<StoreEvent> for WsMessage {
    fn from(event: StoreEvent) -> Self {
        match event {
            StoreEvent::LoadStarted => WsMessage::LoadStarted,
            StoreEvent::CategoriesLoaded { count } => WsMessage::CategoriesLoaded { count },
            StoreEvent::ContentUpdated { version, total } => {
                WsMessage::ContentUpdated { version, total }
            }
            StoreEvent::LoadFinished {
                total,
                failed_categories,
            } => WsMessage::LoadFinished {
                total,
                failed_categories,
            },
            StoreEvent::LoadFailed { error } => WsMessage::LoadFailed { error },
            StoreEvent::PendingSearchResolved { query, results } => {
                WsMessage::SearchResolved { query, results }
            }
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Forward every store event to WebSocket clients until the store's
    /// channel closes.
    pub fn forward_store_events(
        &self,
        mut events: broadcast::Receiver<StoreEvent>,
    ) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => broadcaster.broadcast(WsMessage::from(event)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Store event forwarder lagged, skipped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Store event channel closed");
                        break;
                    }
                }
            }
        })
    }

    /// Send a heartbeat every `period`.
    pub fn spawn_heartbeat(&self, period: Duration) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                broadcaster.broadcast(WsMessage::Heartbeat {
                    timestamp: Utc::now().timestamp(),
                });
            }
        })
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Forward broadcast messages to this client
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

                    match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize WsMessage: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} messages", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
