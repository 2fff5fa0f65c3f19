//! Mattermost (and Slack-compatible) incoming webhook client.

use super::{AlertPayload, DispatchError, Notifier, WebhookTarget};
use crate::constants::NOTIFICATION_TIMEOUT_SECS;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Posts alerts with one long-lived HTTP client
#[derive(Debug, Clone)]
pub struct MattermostNotifier {
    http_client: Client,
}

impl MattermostNotifier {
    /// Client with the default 10 second request timeout
    pub fn new() -> Result<Self, DispatchError> {
        Self::with_timeout(Duration::from_secs(NOTIFICATION_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DispatchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kube-guard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Notifier for MattermostNotifier {
    async fn send(&self, target: &WebhookTarget, payload: &AlertPayload) -> Result<(), DispatchError> {
        debug!(channel = %payload.channel, "Posting alert to chat webhook");

        let response = self.http_client.post(&target.url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
