//! Webhook HTTP surface: liveness/health endpoints and the POST /callback
//! pipeline (signature check → parse → dispatch → itemized results).

use crate::answer::AnswerApi;
use crate::config::Config;
use crate::dispatch;
use crate::events;
use crate::line::MessagingApi;
use crate::signature::verify_signature;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state: immutable config plus the two external clients, passed in
/// explicitly so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub answer: Arc<dyn AnswerApi>,
    pub messaging: Arc<dyn MessagingApi>,
}

/// Build the webhook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/callback", post(callback))
        .with_state(state)
}

/// GET / — liveness probe with the computed webhook URL.
async fn root(headers: HeaderMap) -> Json<serde_json::Value> {
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Json(json!({
        "status": "ok",
        "message": "Askline LINE bot is running",
        "webhook_url": format!("{}://{}/callback", proto, host),
    }))
}

/// GET /health — probes the LINE bot-info endpoint to validate the channel
/// access token. 200 with the bot profile on success, 500 otherwise.
async fn health(State(state): State<AppState>) -> Response {
    match state.messaging.bot_info().await {
        Ok(profile) => Json(json!({
            "status": "ok",
            "message": "LINE API is working",
            "bot_info": profile,
        }))
        .into_response(),
        Err(e) => {
            log::error!("LINE API test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "LINE API authentication failed",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// POST /callback — the webhook entry point.
///
/// Linear pipeline, no retries: bad signature halts with 401 before any
/// parsing; an unparseable body halts with 400 before any dispatch; once
/// dispatched the response is always 200 with the per-event result list
/// (per-event failures were already converted to error notices).
async fn callback(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    // HeaderMap lookup is case-insensitive, covering x-line-signature too.
    let signature = headers
        .get("X-Line-Signature")
        .and_then(|v| v.to_str().ok());
    if !verify_signature(&body, signature, state.config.line.channel_secret.as_deref()) {
        log::error!("signature mismatch");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let payload = match events::parse_payload(&body) {
        Ok(p) => p,
        Err(e) => {
            log::error!("invalid json body: {}", e);
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };

    log::info!(
        "{} webhook received: {} event(s)",
        jst_now(),
        payload.events.len()
    );
    log::debug!("webhook body: {}", String::from_utf8_lossy(&body));

    let results = dispatch::dispatch_all(&state, payload.events).await;
    Json(results).into_response()
}

/// Current time in JST (UTC+9) for the operational receipt log.
fn jst_now() -> String {
    let jst = chrono::FixedOffset::east_opt(9 * 3600).expect("JST offset");
    chrono::Utc::now()
        .with_timezone(&jst)
        .format("%-m/%-d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jst_now_has_month_day_and_time() {
        let s = jst_now();
        // "M/D HH:MM:SS"
        let (date, time) = s.split_once(' ').expect("date and time");
        assert!(date.contains('/'));
        assert_eq!(time.matches(':').count(), 2);
    }
}
