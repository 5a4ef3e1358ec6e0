//! Telegram delivery of startup and cycle reports.

use super::{StartupSummary, SweepNotifier};
use crate::domain::entities::{NetworkOutcome, SweepCycleResult};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::warn;

const TELEGRAM_HTTP_TIMEOUT_SECS: u64 = 5;
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Posts messages to one Telegram chat through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    chat_id: String,
    endpoint: String,
    client: Client,
}

impl TelegramNotifier {
    /// Creates a notifier against the public Bot API.
    #[must_use]
    pub fn new(bot_token: impl AsRef<str>, chat_id: impl Into<String>) -> Self {
        Self::with_api_base(TELEGRAM_API_BASE, bot_token, chat_id)
    }

    /// Creates a notifier against a different API host.
    #[must_use]
    pub fn with_api_base(api_base: &str, bot_token: impl AsRef<str>, chat_id: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(TELEGRAM_HTTP_TIMEOUT_SECS);
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|err| {
            warn!("failed to build Telegram client with timeout ({}); using default client", err);
            Client::new()
        });

        Self {
            chat_id: chat_id.into(),
            endpoint: format!(
                "{}/bot{}/sendMessage",
                api_base.trim_end_matches('/'),
                bot_token.as_ref()
            ),
            client,
        }
    }

    fn render_startup(summary: &StartupSummary) -> String {
        let networks = summary
            .networks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Vault sweeper started{}\nDeposit: {}\nVault: {}\nNetworks: {}\nMinimum: {}\nInterval: {}s",
            if summary.dry_run { " (dry run)" } else { "" },
            summary.deposit_address,
            summary.vault_address,
            networks,
            summary.min_transfer.to_ether_string(),
            summary.interval_ms / 1000
        )
    }

    /// Only cycles that moved value or failed are worth a message.
    fn render_cycle(result: &SweepCycleResult) -> Option<String> {
        let notable: Vec<&NetworkOutcome> = result
            .outcomes
            .iter()
            .filter(|o| o.is_swept() || o.is_failed())
            .collect();
        if notable.is_empty() {
            return None;
        }

        let mut text = format!(
            "Sweep cycle {}: {} swept, {} failed",
            result.cycle_id,
            result.swept_count(),
            result.failed_count()
        );
        for outcome in notable {
            let _ = write!(text, "\n{outcome}");
        }
        Some(text)
    }

    async fn send_message(&self, text: &str) -> Result<(), String> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": true
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            // The endpoint embeds the bot token.
            .map_err(|err| format!("request error: {}", err.without_url()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(format!("telegram API returned {status}: {body}"))
    }
}

#[async_trait]
impl SweepNotifier for TelegramNotifier {
    async fn notify_startup(&self, summary: &StartupSummary) {
        if let Err(err) = self.send_message(&Self::render_startup(summary)).await {
            warn!("failed Telegram startup notification: {}", err);
        }
    }

    async fn notify_shutdown(&self) {
        if let Err(err) = self.send_message("Vault sweeper is shutting down.").await {
            warn!("failed Telegram shutdown notification: {}", err);
        }
    }

    async fn notify_cycle(&self, result: &SweepCycleResult) {
        let Some(message) = Self::render_cycle(result) else {
            return;
        };
        if let Err(err) = self.send_message(&message).await {
            warn!(cycle_id = %result.cycle_id, "failed Telegram cycle notification: {}", err);
        }
    }
}
