//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{NotifyError, NotifyResult};

/// Delivery seam used by the monitor.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message. Returns `false` when delivery was skipped
    /// because the notifier is not configured.
    async fn send(&self, text: &str) -> NotifyResult<bool>;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;
}

// =============================================================================
// Configuration
// =============================================================================

/// Telegram notifier configuration. Missing credentials are not an
/// error: the notifier reports itself unconfigured and sends nothing.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TelegramConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            chat_id: std::env::var("TELEGRAM_CHAT_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            ..Self::default()
        }
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    http: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier.
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("tbrief-notify/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NotifyError::Network)?;

        Ok(Self { http, config })
    }

    async fn post_message(
        &self,
        token: &str,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> NotifyResult<reqwest::Response> {
        let url = format!("{}/bot{}/sendMessage", self.config.api_base, token);
        let payload = SendMessage {
            chat_id,
            text,
            parse_mode,
        };
        Ok(self.http.post(&url).json(&payload).send().await?)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> NotifyResult<bool> {
        let (token, chat_id) = match (&self.config.bot_token, &self.config.chat_id) {
            (Some(token), Some(chat_id)) => (token, chat_id),
            _ => {
                warn!("Telegram not configured, skipping message");
                return Ok(false);
            }
        };

        let response = self
            .post_message(token, chat_id, text, Some("Markdown"))
            .await?;
        if response.status().is_success() {
            debug!("Telegram message delivered");
            return Ok(true);
        }

        // The Bot API rejects messages whose Markdown does not parse.
        // Summaries are model output, so retry once without markup.
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(
            "Telegram rejected Markdown message ({}), retrying as plain text: {}",
            status, body
        );

        let retry = self.post_message(token, chat_id, text, None).await?;
        if retry.status().is_success() {
            debug!("Telegram message delivered as plain text");
            return Ok(true);
        }

        let status = retry.status();
        let body = retry.text().await.unwrap_or_default();
        Err(NotifyError::request_failed(format!(
            "Telegram API returned {status}: {body}"
        )))
    }

    fn is_configured(&self) -> bool {
        self.config.bot_token.is_some() && self.config.chat_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::new(TelegramConfig {
            bot_token: Some("TOKEN".to_string()),
            chat_id: Some("12345".to_string()),
            api_base: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_uses_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "12345",
                "text": "*hello*",
                "parse_mode": "Markdown",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let delivered = notifier(&server).send("*hello*").await.unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn test_markdown_rejection_retries_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({"parse_mode": "Markdown"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Bad Request: can't parse entities",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let delivered = notifier(&server).send("broken *markdown").await.unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn test_both_attempts_rejected_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bot was blocked"))
            .expect(2)
            .mount(&server)
            .await;

        let err = notifier(&server).send("hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::RequestFailed(_)));
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(TelegramConfig {
            api_base: server.uri(),
            ..TelegramConfig::default()
        })
        .unwrap();

        assert!(!notifier.is_configured());
        let delivered = notifier.send("hello").await.unwrap();
        assert!(!delivered);
    }
}
