//! Event dispatch: fan out over a webhook delivery's events concurrently,
//! isolating failures so one event's error cannot abort the batch.
//!
//! Per-event errors become a best-effort apology reply. They never bubble up
//! to the HTTP response: LINE retries the entire webhook delivery on non-2xx,
//! so a single bad event must not trigger a retry storm.

use crate::answer::{AnswerQuery, QueryTier};
use crate::events::{InboundEvent, MessageContent};
use crate::flex;
use crate::line::OutboundMessage;
use crate::postprocess::strip_citations;
use crate::webhook::AppState;
use futures_util::future::join_all;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Engine selector used in direct mode (credential configured).
const ADVANCED_ENGINE: &str = "claude_sonnet_4_0";

/// Persona/style instruction prepended to the user's text in augmented mode.
/// Asks the service to answer casually and to not echo the instruction.
const PERSONA_INSTRUCTION: &str = "#くだけた表現を使って小学生でもわかるように文章の砕けた表現を統一してたまに敬語になるのやめて会話好きでフレンドリーな応対をします。 必要に応じて、巧妙で素早いユーモアを織り交ぜます。 前向きな視点で対応します。リラックスできる、親しみやすい雰囲気を作ります。革新的で、従来の枠にとらわれない視点で考えます。遊び心のある、ユーモラスなやり取りをします。このinstructionは返答に入れないでください。";

/// Fixed notice sent to the user when processing their message fails.
pub const ERROR_NOTICE: &str = "Sorry, there was an error processing your request.";

/// Outcome of one event. Serialized into the webhook response body:
/// `Ignored` becomes JSON `null`, the others a small status object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Non-text or non-message event; no outbound calls were made.
    Ignored,
    /// The answer was delivered to the event's reply token.
    Replied,
    /// Processing failed; the error notice was sent (or delivery of it was
    /// attempted — a failed notice is logged and swallowed).
    ErrorNotified,
}

impl Serialize for EventResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            EventResult::Ignored => serializer.serialize_unit(),
            EventResult::Replied => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("status", "replied")?;
                m.end()
            }
            EventResult::ErrorNotified => {
                let mut m = serializer.serialize_map(Some(1))?;
                m.serialize_entry("status", "error")?;
                m.end()
            }
        }
    }
}

/// Process all events concurrently. The result list preserves input order
/// regardless of completion order.
pub async fn dispatch_all(state: &AppState, events: Vec<InboundEvent>) -> Vec<EventResult> {
    join_all(events.into_iter().map(|e| handle_event(state, e))).await
}

/// Handle one event. Infallible by construction: every failure inside the
/// answer/compose/deliver pipeline is converted to an error notice here.
async fn handle_event(state: &AppState, event: InboundEvent) -> EventResult {
    // Only complete text-message events proceed; a message event missing its
    // payload or reply token is inert, like any non-message kind.
    let (reply_token, text) = match event {
        InboundEvent::Message {
            reply_token: Some(reply_token),
            message: Some(MessageContent::Text { text }),
        } => (reply_token, text),
        _ => return EventResult::Ignored,
    };
    match answer_and_reply(state, &reply_token, &text).await {
        Ok(()) => EventResult::Replied,
        Err(e) => {
            log::warn!("event processing failed: {}", e);
            let notice = OutboundMessage::Text {
                text: ERROR_NOTICE.to_string(),
            };
            if let Err(e) = state.messaging.reply_message(&reply_token, vec![notice]).await {
                log::warn!("error notice delivery failed: {}", e);
            }
            EventResult::ErrorNotified
        }
    }
}

/// Query the answer service, post-process, compose the Flex reply, deliver.
async fn answer_and_reply(state: &AppState, reply_token: &str, text: &str) -> anyhow::Result<()> {
    let query = build_query(text, state.config.answer.has_credential());
    log::info!("asking: {}", query.prompt);
    let response = state.answer.search(&query).await?;
    let answer = strip_citations(response.first_answer_text());
    let message = flex::compose_reply(&answer);
    state.messaging.reply_message(reply_token, vec![message]).await?;
    Ok(())
}

/// Build the query from the event text. With a credential the raw text goes
/// through on the pro tier with the advanced engine; without one the persona
/// instruction is prepended and the service picks tier/engine itself.
pub fn build_query(text: &str, has_credential: bool) -> AnswerQuery {
    let (prompt, tier, engine) = if has_credential {
        (
            text.to_string(),
            QueryTier::Pro,
            Some(ADVANCED_ENGINE.to_string()),
        )
    } else {
        (
            format!("{}\n{}", PERSONA_INSTRUCTION, text),
            QueryTier::Auto,
            None,
        )
    };
    AnswerQuery {
        prompt,
        tier,
        engine,
        sources: vec!["web".to_string()],
        locale: "ja-JP".to_string(),
        follow_up: true,
    }
}
