use std::sync::Arc;

use anyhow::{Context, Result};
use lobby_chat::{ChatController, PresenceNotifier, TopicBroker};
use lobby_config::AppConfig;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Shared broker plus the producers that publish through it
#[derive(Clone)]
pub struct LobbyServices {
    pub broker: Arc<TopicBroker>,
    pub notifier: Arc<PresenceNotifier<Arc<TopicBroker>>>,
    pub controller: Arc<ChatController<Arc<TopicBroker>>>,
}

impl LobbyServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        config
            .validate()
            .context("refusing to start with invalid configuration")?;

        let broker = Arc::new(TopicBroker::from_config(&config.broker));
        let notifier = Arc::new(PresenceNotifier::with_destination(
            broker.clone(),
            config.presence.topic.clone(),
        ));
        let controller = Arc::new(ChatController::from_config(broker.clone(), &config.presence));

        info!(
            topic = %config.presence.topic,
            prefixes = ?config.broker.destination_prefixes,
            capacity = config.broker.channel_capacity,
            "topic broker ready"
        );

        Ok(Self {
            broker,
            notifier,
            controller,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
