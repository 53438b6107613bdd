//! Presence notifications driven by session lifecycle events.

use tracing::{debug, info};

use crate::error::ChatResult;
use crate::message::ChatMessage;
use crate::publisher::Publisher;
use crate::session::{SessionEvent, USERNAME_ATTRIBUTE};
use crate::PUBLIC_TOPIC;

/// Broadcasts a `LEAVE` notice for every lifecycle event whose session
/// recorded a username.
///
/// The notifier keeps no state between calls. Repeated events for the same
/// user produce repeated notices, and publish failures are returned to the
/// caller unchanged.
pub struct PresenceNotifier<P> {
    publisher: P,
    destination: String,
}

impl<P: Publisher> PresenceNotifier<P> {
    pub fn new(publisher: P) -> Self {
        Self::with_destination(publisher, PUBLIC_TOPIC)
    }

    pub fn with_destination(publisher: P, destination: impl Into<String>) -> Self {
        Self {
            publisher,
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Publish a `LEAVE` for the event's session, if it has a username.
    pub fn handle(&self, event: &SessionEvent) -> ChatResult<()> {
        let username = match event.attributes().get(USERNAME_ATTRIBUTE) {
            Some(username) if !username.is_empty() => username,
            _ => {
                debug!(session_id = event.session_id(), "session closed without a username");
                return Ok(());
            }
        };

        info!(
            session_id = event.session_id(),
            username = %username,
            kind = ?event.kind(),
            "user disconnected"
        );

        self.publisher
            .publish(&self.destination, ChatMessage::leave(username))
    }
}
