use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::config::DiscordConfig;
use crate::plugins::traits::Notifier;

/// Discord webhook delivery.
///
/// Without a configured webhook URL every send is a silent no-op, so the
/// watcher can run log-only.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
    username: String,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Self {
        if config.webhook_url.is_none() {
            warn!("no discord webhook url set, discord notifications will not work");
        }
        Self {
            client: Client::new(),
            webhook_url: config.webhook_url.clone(),
            username: config.username.clone(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &str) {
        let Some(webhook_url) = &self.webhook_url else {
            return;
        };

        let payload = json!({
            "content": message,
            "username": self.username,
        });

        match self.client.post(webhook_url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!("discord webhook returned {}", response.status());
            }
            Ok(_) => {}
            Err(e) => warn!("error sending discord message: {e}"),
        }
    }
}
