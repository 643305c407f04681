//! LINE Messaging API client: reply delivery and bot-info probe.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.line.me";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// Outbound LINE message: plain text or a Flex envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: serde_json::Value,
    },
}

/// Abstraction over the LINE Messaging API so the dispatcher and webhook
/// handlers can be exercised with fakes in tests.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Deliver messages to the conversation addressed by a reply token.
    /// The token is single-use; callers consume it at most once per event.
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), LineError>;

    /// Fetch the bot profile; used by the health endpoint to validate the
    /// access token.
    async fn bot_info(&self) -> Result<serde_json::Value, LineError>;
}

/// HTTP client for the LINE Messaging API (Bearer channel access token).
pub struct LineClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(access_token: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            base_url,
            access_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MessagingApi for LineClient {
    /// POST /v2/bot/message/reply
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.base_url);
        let body = json!({ "replyToken": reply_token, "messages": messages });
        let res = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("reply failed: {} {}", status, body)));
        }
        Ok(())
    }

    /// GET /v2/bot/info
    async fn bot_info(&self) -> Result<serde_json::Value, LineError> {
        let url = format!("{}/v2/bot/info", self.base_url);
        let res = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!(
                "bot info failed: {} {}",
                status, body
            )));
        }
        let data = res.json().await?;
        Ok(data)
    }
}
