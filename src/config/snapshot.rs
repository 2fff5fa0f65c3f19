//! # Configuration Snapshot
//!
//! Point-in-time view of the alerting configuration. A snapshot is never edited
//! after construction; a reload builds a new one and swaps it in whole.

use crate::alert::SensitiveAction;
use crate::constants::{
    CONFIG_MAP_KEY, DEFAULT_CHANNEL, DEFAULT_CLUSTER_LABEL, DEFAULT_DISPLAY_NAME,
    DEFAULT_MONITORED_NAMESPACE,
};
use k8s_openapi::api::core::v1::ConfigMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while turning a ConfigMap into a snapshot.
///
/// None of these reach an admission caller: the loader recovers from every one
/// of them by falling back to environment defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ConfigMap {namespace}/{name}: {source}")]
    Fetch {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error("ConfigMap {0} has no data section")]
    MissingData(String),
    #[error("failed to parse {key}: {source}")]
    Parse {
        key: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Alerting configuration, as found under `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    /// The only namespace whose pods raise alerts (exact, case-sensitive match)
    pub monitored_namespace: String,
    /// Human-readable cluster name rendered into every alert
    pub cluster_label: String,
    /// Outbound chat webhook
    pub mattermost: MattermostConfig,
    /// Per-action alert switches
    pub notifications: NotificationToggles,
}

/// Chat webhook target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MattermostConfig {
    /// Incoming webhook URL. Empty disables notifications.
    pub webhook_url: String,
    /// Channel name without the leading `#`
    pub channel: String,
    /// Display name the alert is posted as
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationToggles {
    pub shell_access: bool,
    pub port_forward: bool,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            monitored_namespace: DEFAULT_MONITORED_NAMESPACE.to_string(),
            cluster_label: DEFAULT_CLUSTER_LABEL.to_string(),
            mattermost: MattermostConfig::default(),
            notifications: NotificationToggles::default(),
        }
    }
}

impl Default for MattermostConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            channel: DEFAULT_CHANNEL.to_string(),
            username: DEFAULT_DISPLAY_NAME.to_string(),
        }
    }
}

impl Default for NotificationToggles {
    fn default() -> Self {
        Self {
            shell_access: true,
            port_forward: true,
        }
    }
}

impl ConfigSnapshot {
    /// Parse a `config.yaml` document. Blank documents yield the defaults.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        if document.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(document).map_err(|source| ConfigError::Parse {
            key: CONFIG_MAP_KEY,
            source,
        })
    }

    /// Build a snapshot from a ConfigMap.
    ///
    /// A ConfigMap without a `data` section is an error; one whose data lacks
    /// `config.yaml` is treated as an empty document.
    pub fn from_config_map(config_map: &ConfigMap) -> Result<Self, ConfigError> {
        let data = config_map.data.as_ref().ok_or_else(|| {
            ConfigError::MissingData(
                config_map
                    .metadata
                    .name
                    .clone()
                    .unwrap_or_else(|| "<unnamed>".to_string()),
            )
        })?;
        Self::from_yaml(data.get(CONFIG_MAP_KEY).map_or("", String::as_str))
    }

    /// Snapshot used when the ConfigMap cannot be read
    pub fn from_env() -> Self {
        Self::fallback_with(|key| std::env::var(key).ok())
    }

    /// Fallback snapshot: webhook URL and channel from the given lookup,
    /// hardcoded defaults for everything else
    pub fn fallback_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = MattermostConfig::default();
        Self {
            mattermost: MattermostConfig {
                webhook_url: lookup("MATTERMOST_WEBHOOK_URL").unwrap_or(defaults.webhook_url),
                channel: lookup("MATTERMOST_CHANNEL").unwrap_or(defaults.channel),
                username: defaults.username,
            },
            ..Self::default()
        }
    }

    /// Whether alerts for this action are switched on
    pub fn notifies_on(&self, action: SensitiveAction) -> bool {
        match action {
            SensitiveAction::ShellAccess => self.notifications.shell_access,
            SensitiveAction::PortForward => self.notifications.port_forward,
        }
    }
}

/// Hot-swappable handle to the current snapshot.
///
/// Readers take a cheap `Arc` clone and keep working with it even if a reload
/// lands mid-request, so nobody ever observes a half-updated configuration.
#[derive(Debug, Clone)]
pub struct SharedSnapshot(Arc<RwLock<Arc<ConfigSnapshot>>>);

impl SharedSnapshot {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(snapshot))))
    }

    pub async fn current(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&*self.0.read().await)
    }

    /// Replace the whole snapshot
    pub async fn replace(&self, snapshot: ConfigSnapshot) {
        *self.0.write().await = Arc::new(snapshot);
    }
}
