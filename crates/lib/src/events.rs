//! LINE webhook payload model.
//!
//! Events use a tagged-variant model so the "ignore everything that is not a
//! text message" rule falls out of exhaustive matching instead of runtime
//! field probing.

use serde::Deserialize;

/// Body of a webhook POST: a list of zero or more events. A body without an
/// `events` field is an empty delivery, not an error.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

/// One webhook event. Only `message` events carry a payload we act on; every
/// other kind (follow, unfollow, join, postback, ...) is structurally valid
/// but inert.
///
/// The fields are tolerant: a `message` event missing its payload or reply
/// token is ignored by the dispatcher, never a parse error. Rejecting it
/// would fail the whole delivery with 400 and make LINE re-deliver every
/// sibling event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        /// Single-use token addressing exactly one reply to this event.
        #[serde(default)]
        reply_token: Option<String>,
        #[serde(default)]
        message: Option<MessageContent>,
    },
    #[serde(other)]
    Other,
}

/// Message content by sub-type. Non-text messages (image, sticker, ...) are
/// kept as `Other` and ignored by the dispatcher.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MessageContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Parse a raw webhook body. Any syntactic failure is an error (HTTP 400 at
/// the endpoint); a partial payload is never produced.
pub fn parse_payload(raw: &[u8]) -> Result<WebhookPayload, serde_json::Error> {
    serde_json::from_slice(raw)
}
