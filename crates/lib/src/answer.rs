//! Answer-generation service client (Perplexity-style search endpoint).
//!
//! The service is an external collaborator behind a narrow interface: a query
//! goes in, a block list comes back, and the first ask-text block is the
//! answer. Its retrieval and ranking internals are opaque to this bot.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.perplexity.ai";

/// A single slow search must not hold a reply token indefinitely; a timeout
/// is handled like any other per-event error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Client error taxonomy: transport failures vs non-2xx API responses.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("answer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("answer api error: {0}")]
    Api(String),
}

/// Service tier: `pro` when a credential is configured, `auto` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryTier {
    Pro,
    Auto,
}

/// One search request. Built by the dispatcher from an inbound event's text
/// plus credential presence (mode and engine selection).
#[derive(Debug, Clone, Serialize)]
pub struct AnswerQuery {
    pub prompt: String,
    pub tier: QueryTier,
    /// Engine selector; `None` lets the service pick its default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    pub sources: Vec<String>,
    pub locale: String,
    pub follow_up: bool,
}

/// Search response: an ordered list of content blocks.
#[derive(Debug, Default, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub blocks: Vec<AnswerBlock>,
}

/// Response block by kind. Only ask-text blocks carry answer text; web
/// results and anything else are ignored here.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerBlock {
    AskText {
        #[serde(default)]
        answer: String,
    },
    #[serde(other)]
    Other,
}

impl AnswerResponse {
    /// First available ask-text answer; empty string when none is present.
    /// First match wins — text from different blocks is never mixed.
    pub fn first_answer_text(&self) -> &str {
        self.blocks
            .iter()
            .find_map(|b| match b {
                AnswerBlock::AskText { answer } => Some(answer.as_str()),
                AnswerBlock::Other => None,
            })
            .unwrap_or("")
    }
}

/// Abstraction over the answer service so the dispatcher can be exercised
/// with fakes in tests.
#[async_trait]
pub trait AnswerApi: Send + Sync {
    async fn search(&self, query: &AnswerQuery) -> Result<AnswerResponse, AnswerError>;
}

/// HTTP client for the answer service. Authenticates with a session cookie
/// string when one is configured.
pub struct AnswerClient {
    base_url: String,
    cookie_header: Option<String>,
    client: reqwest::Client,
}

impl AnswerClient {
    pub fn new(base_url: Option<String>, cookies: Option<Vec<(String, String)>>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let cookie_header = cookies.map(|pairs| {
            pairs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ")
        });
        Self {
            base_url,
            cookie_header,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AnswerApi for AnswerClient {
    /// POST /search — submit a query and collect the block list.
    async fn search(&self, query: &AnswerQuery) -> Result<AnswerResponse, AnswerError> {
        let url = format!("{}/search", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(query);
        if let Some(ref cookie) = self.cookie_header {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AnswerError::Api(format!("{} {}", status, body)));
        }
        let data: AnswerResponse = res.json().await?;
        Ok(data)
    }
}

/// Parse a cookie-string credential ("k=v; k2=v2") into name/value pairs.
/// Entries without an `=` are skipped; returns `None` when nothing parses,
/// so a junk env value degrades the same way as an unset one.
pub fn parse_cookie_env(raw: &str) -> Option<Vec<(String, String)>> {
    let pairs: Vec<(String, String)> = raw
        .split(';')
        .filter_map(|entry| {
            let (name, value) = entry.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs)
    }
}
