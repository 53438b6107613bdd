//! Chat WebSocket handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitStream, SinkExt, StreamExt};
use lobby_chat::AttributeStore;
use lobby_config::has_prefix;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;
use crate::websocket::events::{ChatClientEvent, ChatServerEvent};

/// Chat WebSocket connection handler
pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_chat_websocket(socket, state))
}

/// Per-connection state: the session's attributes and its live subscriptions
struct ChatConnection {
    session_id: String,
    attributes: AttributeStore,
    state: Arc<GatewayState>,
    outbound: mpsc::Sender<ChatServerEvent>,
    subscriptions: HashMap<String, JoinHandle<()>>,
}

/// Handle chat WebSocket connection
async fn handle_chat_websocket(socket: WebSocket, state: Arc<GatewayState>) {
    let (session_id, attributes) = state.sessions.open().await;
    info!(session_id = %session_id, "websocket session opened");

    // Split WebSocket into sender and receiver
    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::channel::<ChatServerEvent>(state.outbound_capacity);

    // Spawn task to write outgoing frames
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "failed to serialize server frame"),
            }
        }
    });

    let mut connection = ChatConnection {
        session_id: session_id.clone(),
        attributes,
        state: state.clone(),
        outbound,
        subscriptions: HashMap::new(),
    };

    connection
        .reply(ChatServerEvent::Connected {
            session_id: session_id.clone(),
        })
        .await;

    // Wait for either the client to go away or the writer to fail
    tokio::select! {
        _ = connection.read_frames(&mut receiver) => {},
        _ = &mut send_task => {},
    }

    connection.close();
    send_task.abort();

    // Clean up session and announce the departure
    if let Some(event) = state.sessions.close(&session_id).await {
        if let Err(error) = state.notifier.handle(&event) {
            warn!(session_id = %session_id, %error, "failed to publish presence notice");
        }
    }
    info!(session_id = %session_id, "websocket session closed");
}

impl ChatConnection {
    async fn read_frames(&mut self, receiver: &mut SplitStream<WebSocket>) {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(error) = self.handle_text(&text).await {
                        debug!(session_id = %self.session_id, %error, "rejected client frame");
                        self.reply(ChatServerEvent::Error {
                            error: error.code().to_string(),
                            message: error.to_string(),
                        })
                        .await;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(error) => {
                    debug!(session_id = %self.session_id, %error, "websocket receive error");
                    break;
                }
            }
        }
    }

    async fn handle_text(&mut self, text: &str) -> GatewayResult<()> {
        let event = serde_json::from_str::<ChatClientEvent>(text)?;
        self.handle_event(event).await
    }

    /// Handle chat client events
    async fn handle_event(&mut self, event: ChatClientEvent) -> GatewayResult<()> {
        match event {
            ChatClientEvent::Ping => {
                self.reply(ChatServerEvent::Pong).await;
            }
            ChatClientEvent::Subscribe { destination } => {
                self.subscribe(&destination)?;
                self.reply(ChatServerEvent::Subscribed { destination }).await;
            }
            ChatClientEvent::Unsubscribe { destination } => {
                if let Some(task) = self.subscriptions.remove(&destination) {
                    task.abort();
                }
                self.reply(ChatServerEvent::Unsubscribed { destination }).await;
            }
            ChatClientEvent::Send { destination, payload } => {
                let prefix = self.state.application_prefix.as_str();
                if has_prefix(&destination, prefix) {
                    let route = destination[prefix.len()..].trim_start_matches('/');
                    self.state
                        .controller
                        .route(route, &self.attributes, payload)?;
                } else if self.state.broker.routes(&destination) {
                    self.state
                        .controller
                        .relay(&destination, &self.attributes, payload)?;
                } else {
                    return Err(GatewayError::UnknownDestination(destination));
                }
            }
        }
        Ok(())
    }

    /// Forward everything published to `destination` into this connection
    fn subscribe(&mut self, destination: &str) -> GatewayResult<()> {
        if self.subscriptions.contains_key(destination) {
            return Ok(());
        }

        let mut messages = self.state.broker.subscribe(destination)?;
        let outbound = self.outbound.clone();
        let topic = destination.to_string();
        let session_id = self.session_id.clone();

        let task = tokio::spawn(async move {
            loop {
                match messages.recv().await {
                    Ok(payload) => {
                        let event = ChatServerEvent::Message {
                            destination: topic.clone(),
                            payload,
                        };
                        if outbound.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session_id = %session_id, destination = %topic, skipped, "subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.subscriptions.insert(destination.to_string(), task);
        Ok(())
    }

    async fn reply(&self, event: ChatServerEvent) {
        let _ = self.outbound.send(event).await;
    }

    fn close(&mut self) {
        for (_, task) in self.subscriptions.drain() {
            task.abort();
        }
    }
}
