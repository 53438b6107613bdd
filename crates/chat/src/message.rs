//! Chat message wire model.

use serde::{Deserialize, Serialize};

/// Kind of a chat message as seen by subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Join,
    Leave,
    Chat,
}

/// Message published to topic subscribers.
///
/// JOIN and LEAVE notices carry no content; the field is omitted from the wire
/// form when absent, so a LEAVE serialises as `{"type":"LEAVE","sender":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn join(sender: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Join,
            sender: sender.into(),
            content: None,
        }
    }

    pub fn leave(sender: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Leave,
            sender: sender.into(),
            content: None,
        }
    }

    pub fn chat(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Chat,
            sender: sender.into(),
            content: Some(content.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leave_serialises_without_content() {
        let value = serde_json::to_value(ChatMessage::leave("alice")).unwrap();
        assert_eq!(value, json!({ "type": "LEAVE", "sender": "alice" }));
    }

    #[test]
    fn chat_serialises_content() {
        let value = serde_json::to_value(ChatMessage::chat("bob", "hi")).unwrap();
        assert_eq!(value, json!({ "type": "CHAT", "sender": "bob", "content": "hi" }));
    }

    #[test]
    fn client_payload_without_sender_deserialises() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"type":"CHAT","content":"hello"}"#).unwrap();
        assert_eq!(message.message_type, MessageType::Chat);
        assert!(message.sender.is_empty());
        assert_eq!(message.content.as_deref(), Some("hello"));
    }

    #[test]
    fn lowercase_type_is_rejected() {
        let result = serde_json::from_str::<ChatMessage>(r#"{"type":"leave","sender":"a"}"#);
        assert!(result.is_err());
    }
}
