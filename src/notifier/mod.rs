//! # Notification Dispatcher
//!
//! Best-effort delivery of alert messages to a chat webhook.
//!
//! [`dispatch`] never returns an error: an empty webhook URL is a no-op and every
//! delivery failure is logged and reported only as [`DispatchOutcome::Failed`].
//! There is no retry and no backoff.

mod mattermost;

pub use mattermost::MattermostNotifier;

use crate::config::ConfigSnapshot;
use crate::constants::ALERT_ICON_EMOJI;
use crate::observability::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

/// Where an alert is posted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    /// Incoming webhook URL; empty means notifications are disabled
    pub url: String,
    /// Channel name without the leading `#`
    pub channel: String,
    pub display_name: String,
}

impl WebhookTarget {
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Self {
        Self {
            url: snapshot.mattermost.webhook_url.clone(),
            channel: snapshot.mattermost.channel.clone(),
            display_name: snapshot.mattermost.username.clone(),
        }
    }
}

/// JSON body of an incoming-webhook post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub channel: String,
    pub username: String,
    pub text: String,
    pub icon_emoji: String,
}

impl AlertPayload {
    pub fn new(target: &WebhookTarget, message: &str) -> Self {
        Self {
            channel: format!("#{}", target.channel),
            username: target.display_name.clone(),
            text: message.to_string(),
            icon_emoji: ALERT_ICON_EMOJI.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection failure, timeout, or invalid URL
    #[error("chat webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// A single outbound post. Implementations make exactly one attempt.
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    async fn send(&self, target: &WebhookTarget, payload: &AlertPayload) -> Result<(), DispatchError>;
}

/// What happened to one alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// No webhook URL configured, nothing was sent
    Skipped,
    Failed,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Post `message` to `target`, swallowing every failure
pub async fn dispatch(
    notifier: &dyn Notifier,
    target: &WebhookTarget,
    message: &str,
) -> DispatchOutcome {
    let outcome = if target.url.is_empty() {
        warn!("Mattermost webhook URL not configured, skipping notification");
        DispatchOutcome::Skipped
    } else {
        let payload = AlertPayload::new(target, message);
        match notifier.send(target, &payload).await {
            Ok(()) => {
                info!(channel = %payload.channel, "Notification sent to Mattermost");
                DispatchOutcome::Delivered
            }
            Err(e) => {
                error!(error = %e, channel = %payload.channel, "Failed to send Mattermost notification");
                DispatchOutcome::Failed
            }
        }
    };

    metrics::increment_notifications(outcome);
    outcome
}
