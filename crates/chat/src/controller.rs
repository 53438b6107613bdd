//! Handlers for application destinations sent by chat clients.

use lobby_config::PresenceConfig;
use tracing::info;

use crate::error::{ChatError, ChatResult};
use crate::message::{ChatMessage, MessageType};
use crate::publisher::Publisher;
use crate::session::{AttributeStore, SessionAttributes, USERNAME_ATTRIBUTE};
use crate::PUBLIC_TOPIC;

/// Destination suffix a client sends to in order to join under a username.
pub const ADD_USER_ROUTE: &str = "chat.addUser";
/// Destination suffix a client sends chat lines to.
pub const SEND_MESSAGE_ROUTE: &str = "chat.sendMessage";

const DEFAULT_MAX_USERNAME_LENGTH: usize = 32;

/// Turns client sends into broadcasts on the public topic.
pub struct ChatController<P> {
    publisher: P,
    topic: String,
    max_username_length: usize,
}

impl<P: Publisher> ChatController<P> {
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            topic: PUBLIC_TOPIC.to_string(),
            max_username_length: DEFAULT_MAX_USERNAME_LENGTH,
        }
    }

    pub fn from_config(publisher: P, config: &PresenceConfig) -> Self {
        Self {
            publisher,
            topic: config.topic.clone(),
            max_username_length: config.max_username_length,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Dispatch a send by the route that follows the application prefix
    pub fn route(&self, route: &str, session: &AttributeStore, message: ChatMessage) -> ChatResult<()> {
        match route {
            ADD_USER_ROUTE => self.add_user(session, message),
            SEND_MESSAGE_ROUTE => self.send_message(session, message),
            other => Err(ChatError::unknown_destination(other)),
        }
    }

    /// Record the sender as the session's username and announce the join
    pub fn add_user(&self, session: &AttributeStore, message: ChatMessage) -> ChatResult<()> {
        let username = message.sender.trim();
        if username.is_empty() {
            return Err(ChatError::validation("username must not be empty"));
        }
        if username.chars().count() > self.max_username_length {
            return Err(ChatError::validation(format!(
                "username must be at most {} characters",
                self.max_username_length
            )));
        }

        session.insert(USERNAME_ATTRIBUTE, username);
        info!(username, "user joined");

        self.publisher
            .publish(&self.topic, ChatMessage::join(username))
    }

    /// Broadcast a chat line on behalf of the session's user
    pub fn send_message(&self, session: &AttributeStore, message: ChatMessage) -> ChatResult<()> {
        let line = self.chat_line(session, message)?;
        self.publisher.publish(&self.topic, line)
    }

    /// Publish a chat line straight to a broker destination.
    ///
    /// Same rules as `send_message`: the session must have joined, only CHAT
    /// payloads pass, and the sender is the session's username.
    pub fn relay(
        &self,
        destination: &str,
        session: &AttributeStore,
        message: ChatMessage,
    ) -> ChatResult<()> {
        let line = self.chat_line(session, message)?;
        self.publisher.publish(destination, line)
    }

    fn chat_line(&self, session: &AttributeStore, message: ChatMessage) -> ChatResult<ChatMessage> {
        let username = session
            .get(USERNAME_ATTRIBUTE)
            .filter(|username| !username.is_empty())
            .ok_or(ChatError::NotJoined)?;

        if message.message_type != MessageType::Chat {
            return Err(ChatError::validation("only CHAT messages can be sent"));
        }

        let content = message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ChatError::validation("message content must not be empty"))?;

        Ok(ChatMessage::chat(username, content))
    }
}
