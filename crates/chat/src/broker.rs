//! In-process topic broker.

use std::collections::HashMap;
use std::sync::RwLock;

use lobby_config::BrokerConfig;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{ChatError, ChatResult};
use crate::message::ChatMessage;
use crate::publisher::Publisher;

/// Fans messages out to every subscriber of a destination.
///
/// One `broadcast` channel is created lazily per destination. Only
/// destinations under one of the configured prefixes are routable.
pub struct TopicBroker {
    capacity: usize,
    prefixes: Vec<String>,
    topics: RwLock<HashMap<String, broadcast::Sender<ChatMessage>>>,
}

impl TopicBroker {
    pub fn new(capacity: usize, prefixes: Vec<String>) -> Self {
        Self {
            capacity: capacity.max(1),
            prefixes,
            topics: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &BrokerConfig) -> Self {
        Self::new(config.channel_capacity, config.destination_prefixes.clone())
    }

    /// Whether a destination falls under one of the broker prefixes
    pub fn routes(&self, destination: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| lobby_config::has_prefix(destination, prefix))
    }

    /// Subscribe to a destination, creating its channel on first use
    pub fn subscribe(&self, destination: &str) -> ChatResult<broadcast::Receiver<ChatMessage>> {
        if !self.routes(destination) {
            return Err(ChatError::unroutable(destination));
        }

        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        prune_idle(&mut topics);
        let sender = topics
            .entry(destination.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);

        debug!(destination, subscribers = sender.receiver_count() + 1, "subscribed");
        Ok(sender.subscribe())
    }

    /// Drop channels nobody listens to any more, returning how many went
    pub fn prune(&self) -> usize {
        let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
        prune_idle(&mut topics)
    }

    /// Number of destinations that currently hold a channel
    pub fn topic_count(&self) -> usize {
        self.topics.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of live receivers for a destination
    pub fn subscriber_count(&self, destination: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
        topics
            .get(destination)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }
}

impl Publisher for TopicBroker {
    fn publish(&self, destination: &str, message: ChatMessage) -> ChatResult<()> {
        if !self.routes(destination) {
            return Err(ChatError::unroutable(destination));
        }

        let abandoned = {
            let topics = self.topics.read().unwrap_or_else(|e| e.into_inner());
            match topics.get(destination) {
                Some(sender) => match sender.send(message) {
                    Ok(delivered) => {
                        debug!(destination, delivered, "published message");
                        false
                    }
                    // nobody is listening; the message is dropped
                    Err(_) => true,
                },
                None => false,
            }
        };

        if abandoned {
            let mut topics = self.topics.write().unwrap_or_else(|e| e.into_inner());
            if topics
                .get(destination)
                .is_some_and(|sender| sender.receiver_count() == 0)
            {
                topics.remove(destination);
                debug!(destination, "dropped channel without subscribers");
            }
        }
        Ok(())
    }
}

fn prune_idle(topics: &mut HashMap<String, broadcast::Sender<ChatMessage>>) -> usize {
    let before = topics.len();
    topics.retain(|_, sender| sender.receiver_count() > 0);
    before - topics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PUBLIC_TOPIC;

    fn broker() -> TopicBroker {
        TopicBroker::new(8, vec!["/topic".to_string()])
    }

    #[test]
    fn subscribers_receive_published_messages() {
        let broker = broker();
        let mut first = broker.subscribe(PUBLIC_TOPIC).unwrap();
        let mut second = broker.subscribe(PUBLIC_TOPIC).unwrap();

        broker.publish(PUBLIC_TOPIC, ChatMessage::join("alice")).unwrap();

        assert_eq!(first.try_recv().unwrap(), ChatMessage::join("alice"));
        assert_eq!(second.try_recv().unwrap(), ChatMessage::join("alice"));
        assert_eq!(broker.subscriber_count(PUBLIC_TOPIC), 2);
    }

    #[test]
    fn destinations_are_isolated() {
        let broker = broker();
        let mut public = broker.subscribe(PUBLIC_TOPIC).unwrap();
        let _other = broker.subscribe("/topic/other").unwrap();

        broker.publish("/topic/other", ChatMessage::leave("bob")).unwrap();

        assert!(public.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_succeeds() {
        let broker = broker();
        assert!(broker.publish(PUBLIC_TOPIC, ChatMessage::leave("alice")).is_ok());

        let receiver = broker.subscribe(PUBLIC_TOPIC).unwrap();
        drop(receiver);
        assert!(broker.publish(PUBLIC_TOPIC, ChatMessage::leave("alice")).is_ok());
        assert_eq!(broker.subscriber_count(PUBLIC_TOPIC), 0);
    }

    #[test]
    fn idle_destinations_do_not_accumulate() {
        let broker = broker();
        for index in 0..1000 {
            let receiver = broker.subscribe(&format!("/topic/junk-{index}")).unwrap();
            drop(receiver);
        }
        let remaining = broker.topic_count();
        assert!(remaining <= 1);

        assert_eq!(broker.prune(), remaining);
        assert_eq!(broker.topic_count(), 0);
    }

    #[test]
    fn live_destinations_survive_pruning() {
        let broker = broker();
        let mut public = broker.subscribe(PUBLIC_TOPIC).unwrap();
        drop(broker.subscribe("/topic/idle").unwrap());

        assert_eq!(broker.prune(), 1);
        assert_eq!(broker.topic_count(), 1);

        broker.publish(PUBLIC_TOPIC, ChatMessage::join("alice")).unwrap();
        assert_eq!(public.try_recv().unwrap(), ChatMessage::join("alice"));
    }

    #[test]
    fn publish_to_abandoned_destination_removes_it() {
        let broker = broker();
        drop(broker.subscribe("/topic/gone").unwrap());
        assert_eq!(broker.topic_count(), 1);

        broker.publish("/topic/gone", ChatMessage::leave("bob")).unwrap();
        assert_eq!(broker.topic_count(), 0);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let broker = broker();
        let mut public = broker.subscribe(PUBLIC_TOPIC).unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = broker.topics.write().unwrap();
            panic!("writer died holding the lock");
        }));
        assert!(outcome.is_err());
        assert!(broker.topics.is_poisoned());

        broker.publish(PUBLIC_TOPIC, ChatMessage::leave("alice")).unwrap();
        assert_eq!(public.try_recv().unwrap(), ChatMessage::leave("alice"));
        assert!(broker.subscribe("/topic/other").is_ok());
        assert_eq!(broker.subscriber_count(PUBLIC_TOPIC), 1);
        assert_eq!(broker.topic_count(), 2);
    }

    #[test]
    fn unroutable_destinations_are_rejected() {
        let broker = broker();

        assert!(matches!(
            broker.publish("/queue/private", ChatMessage::leave("alice")),
            Err(ChatError::UnroutableDestination { .. })
        ));
        assert!(broker.subscribe("/topicality").is_err());
        assert!(broker.routes("/topic"));
        assert!(broker.routes("/topic/public"));
    }

    #[test]
    fn from_config_uses_configured_prefixes() {
        let config = BrokerConfig {
            channel_capacity: 4,
            destination_prefixes: vec!["/queue".to_string()],
            application_prefix: "/app".to_string(),
        };
        let broker = TopicBroker::from_config(&config);

        assert!(broker.routes("/queue/jobs"));
        assert!(!broker.routes(PUBLIC_TOPIC));
    }
}
