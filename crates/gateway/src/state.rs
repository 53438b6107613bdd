//! Shared application state for the gateway

use std::collections::HashMap;
use std::sync::Arc;

use lobby_chat::{AttributeStore, ChatController, PresenceNotifier, SessionEvent, TopicBroker};
use lobby_config::{AppConfig, BrokerConfig};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};

/// Outbound frames buffered per connection before the socket writer applies
/// backpressure to subscription forwarders.
const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Attribute stores of every open WebSocket session, keyed by session id
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, AttributeStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, returning its id and attribute store
    pub async fn open(&self) -> (String, AttributeStore) {
        let session_id = Uuid::new_v4().to_string();
        let attributes = AttributeStore::new();

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.clone(), attributes.clone());

        (session_id, attributes)
    }

    /// Forget a session and report it as disconnected.
    ///
    /// Returns `None` when the session was already closed.
    pub async fn close(&self, session_id: &str) -> Option<SessionEvent> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|attributes| SessionEvent::disconnected(session_id, attributes))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Shared application state containing the broker and message producers
#[derive(Clone)]
pub struct GatewayState {
    /// Topic broker subscriptions are served from
    pub broker: Arc<TopicBroker>,
    /// Open sessions
    pub sessions: SessionRegistry,
    /// Announces departures when a session closes
    pub notifier: Arc<PresenceNotifier<Arc<TopicBroker>>>,
    /// Handles `/app/...` sends
    pub controller: Arc<ChatController<Arc<TopicBroker>>>,
    /// Prefix that routes client sends to the controller
    pub application_prefix: String,
    /// Frames buffered per connection
    pub outbound_capacity: usize,
}

impl GatewayState {
    pub fn new(
        broker: Arc<TopicBroker>,
        notifier: Arc<PresenceNotifier<Arc<TopicBroker>>>,
        controller: Arc<ChatController<Arc<TopicBroker>>>,
        config: &BrokerConfig,
    ) -> Self {
        Self {
            broker,
            sessions: SessionRegistry::new(),
            notifier,
            controller,
            application_prefix: config.application_prefix.clone(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY.max(config.channel_capacity),
        }
    }

    /// Build the broker, notifier and controller straight from configuration
    pub fn from_config(config: &AppConfig) -> GatewayResult<Self> {
        config
            .validate()
            .map_err(|error| GatewayError::Configuration(format!("{error:#}")))?;

        let broker = Arc::new(TopicBroker::from_config(&config.broker));
        let notifier = Arc::new(PresenceNotifier::with_destination(
            broker.clone(),
            config.presence.topic.clone(),
        ));
        let controller = Arc::new(ChatController::from_config(broker.clone(), &config.presence));

        Ok(Self::new(broker, notifier, controller, &config.broker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobby_chat::{SessionAttributes, SessionEventKind, USERNAME_ATTRIBUTE};

    #[tokio::test]
    async fn registry_open_and_close_share_attributes() {
        let registry = SessionRegistry::new();
        let (session_id, attributes) = registry.open().await;
        assert_eq!(registry.count().await, 1);

        attributes.insert(USERNAME_ATTRIBUTE, "alice");

        let closed = registry
            .close(&session_id)
            .await
            .expect("session should be registered");
        assert_eq!(closed.kind(), SessionEventKind::Disconnected);
        assert_eq!(closed.session_id(), session_id);
        assert_eq!(closed.attributes().get(USERNAME_ATTRIBUTE).as_deref(), Some("alice"));
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn closing_twice_reports_once() {
        let registry = SessionRegistry::new();
        let (session_id, _) = registry.open().await;

        assert!(registry.close(&session_id).await.is_some());
        assert!(registry.close(&session_id).await.is_none());
    }

    #[test]
    fn from_config_rejects_invalid_configuration() {
        let mut config = AppConfig::default();
        config.presence.topic = "/queue/public".to_string();

        assert!(matches!(
            GatewayState::from_config(&config),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn from_config_uses_presence_topic() {
        let state = GatewayState::from_config(&AppConfig::default()).unwrap();
        assert_eq!(state.notifier.destination(), "/topic/public");
        assert_eq!(state.controller.topic(), "/topic/public");
        assert_eq!(state.application_prefix, "/app");
    }
}
