use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "lobby.toml",
    "config/lobby.toml",
    "crates/config/lobby.toml",
    "../lobby.toml",
    "../config/lobby.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub broker: BrokerConfig,
    pub presence: PresenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Settings for the in-process topic broker.
///
/// ```
/// use lobby_config::BrokerConfig;
///
/// let broker = BrokerConfig::default();
/// assert_eq!(broker.channel_capacity, 100);
/// assert_eq!(broker.destination_prefixes, vec!["/topic".to_string()]);
/// assert_eq!(broker.application_prefix, "/app");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "BrokerConfig::default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "BrokerConfig::default_destination_prefixes")]
    pub destination_prefixes: Vec<String>,
    #[serde(default = "BrokerConfig::default_application_prefix")]
    pub application_prefix: String,
}

impl BrokerConfig {
    const fn default_channel_capacity() -> usize {
        100
    }

    fn default_destination_prefixes() -> Vec<String> {
        vec!["/topic".to_string()]
    }

    fn default_application_prefix() -> String {
        "/app".to_string()
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::default_channel_capacity(),
            destination_prefixes: Self::default_destination_prefixes(),
            application_prefix: Self::default_application_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "PresenceConfig::default_topic")]
    pub topic: String,
    #[serde(default = "PresenceConfig::default_max_username_length")]
    pub max_username_length: usize,
}

impl PresenceConfig {
    fn default_topic() -> String {
        "/topic/public".to_string()
    }

    const fn default_max_username_length() -> usize {
        32
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            topic: Self::default_topic(),
            max_username_length: Self::default_max_username_length(),
        }
    }
}

/// Whether `destination` is `prefix` itself or a path below it.
///
/// ```
/// use lobby_config::has_prefix;
///
/// assert!(has_prefix("/topic/public", "/topic"));
/// assert!(has_prefix("/topic", "/topic"));
/// assert!(!has_prefix("/topical", "/topic"));
/// ```
pub fn has_prefix(destination: &str, prefix: &str) -> bool {
    match destination.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

impl AppConfig {
    /// Reject settings the broker cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.broker.channel_capacity > 0,
            "broker.channel_capacity must be greater than zero"
        );
        ensure!(
            self.presence.max_username_length > 0,
            "presence.max_username_length must be greater than zero"
        );
        ensure!(
            self.broker
                .destination_prefixes
                .iter()
                .any(|prefix| has_prefix(&self.presence.topic, prefix)),
            "presence.topic {} is not routed by any broker prefix",
            self.presence.topic
        );
        ensure!(
            !self
                .broker
                .destination_prefixes
                .iter()
                .any(|prefix| has_prefix(&self.broker.application_prefix, prefix)),
            "broker.application_prefix {} overlaps a broker prefix",
            self.broker.application_prefix
        );
        Ok(())
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use lobby_config::load;
///
/// std::env::remove_var("LOBBY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let channel_capacity = i64::try_from(defaults.broker.channel_capacity).unwrap_or(i64::MAX);
    let max_username_length =
        i64::try_from(defaults.presence.max_username_length).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("broker.channel_capacity", channel_capacity)?
        .set_default(
            "broker.destination_prefixes",
            defaults.broker.destination_prefixes.clone(),
        )?
        .set_default(
            "broker.application_prefix",
            defaults.broker.application_prefix.clone(),
        )?
        .set_default("presence.topic", defaults.presence.topic.clone())?
        .set_default("presence.max_username_length", max_username_length)?;

    let environment_overrides = config::Environment::with_prefix("LOBBY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("LOBBY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via LOBBY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid configuration")?;

    debug!(?config, "loaded lobby configuration");
    Ok(config)
}
