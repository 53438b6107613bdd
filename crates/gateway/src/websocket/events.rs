//! Frames exchanged with WebSocket clients

use lobby_chat::ChatMessage;
use serde::{Deserialize, Serialize};

/// Client frames received from WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatClientEvent {
    /// Heartbeat to keep connection alive
    Ping,
    /// Start receiving messages published to a destination
    Subscribe { destination: String },
    /// Stop receiving messages for a destination
    Unsubscribe { destination: String },
    /// Send a message to an application or broker destination
    Send {
        destination: String,
        payload: ChatMessage,
    },
}

/// Server frames sent to WebSocket clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatServerEvent {
    /// First frame on every connection
    Connected { session_id: String },
    /// Heartbeat response
    Pong,
    /// Subscription confirmation
    Subscribed { destination: String },
    /// Unsubscription confirmation
    Unsubscribed { destination: String },
    /// Message delivered from a subscribed destination
    Message {
        destination: String,
        payload: ChatMessage,
    },
    /// Error response
    Error { error: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_frame_parses_chat_payload() {
        let frame: ChatClientEvent = serde_json::from_value(json!({
            "type": "send",
            "destination": "/app/chat.addUser",
            "payload": { "type": "JOIN", "sender": "alice" }
        }))
        .unwrap();

        match frame {
            ChatClientEvent::Send { destination, payload } => {
                assert_eq!(destination, "/app/chat.addUser");
                assert_eq!(payload, ChatMessage::join("alice"));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn message_frame_nests_wire_message() {
        let frame = ChatServerEvent::Message {
            destination: "/topic/public".to_string(),
            payload: ChatMessage::leave("alice"),
        };

        assert_eq!(
            serde_json::to_value(frame).unwrap(),
            json!({
                "type": "message",
                "destination": "/topic/public",
                "payload": { "type": "LEAVE", "sender": "alice" }
            })
        );
    }
}
