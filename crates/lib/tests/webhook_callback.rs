//! Integration test: start the webhook server on a free port with fake
//! clients, then exercise the /callback pipeline over real HTTP.
//! Does not require LINE or the answer service.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use lib::answer::{AnswerApi, AnswerBlock, AnswerError, AnswerQuery, AnswerResponse};
use lib::config::{AnswerConfig, Config, LineConfig, ServerConfig};
use lib::line::{LineError, MessagingApi, OutboundMessage};
use sha2::Sha256;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CHANNEL_SECRET: &str = "test-channel-secret";

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn test_config(port: u16) -> Config {
    Config {
        server: ServerConfig {
            port,
            bind: "127.0.0.1".to_string(),
        },
        line: LineConfig {
            channel_access_token: "test-token".to_string(),
            channel_secret: Some(CHANNEL_SECRET.to_string()),
            api_base: None,
        },
        answer: AnswerConfig {
            cookies: Some(vec![("sid".to_string(), "abc".to_string())]),
            base_url: None,
        },
    }
}

fn sign(body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(CHANNEL_SECRET.as_bytes()).expect("hmac key length");
    mac.update(body.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

struct FakeAnswer;

#[async_trait]
impl AnswerApi for FakeAnswer {
    async fn search(&self, query: &AnswerQuery) -> Result<AnswerResponse, AnswerError> {
        Ok(AnswerResponse {
            blocks: vec![AnswerBlock::AskText {
                answer: format!("answer to {} [1]", query.prompt),
            }],
        })
    }
}

#[derive(Default)]
struct FakeMessaging {
    sent: Mutex<Vec<(String, Vec<OutboundMessage>)>>,
}

#[async_trait]
impl MessagingApi for FakeMessaging {
    async fn reply_message(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), LineError> {
        self.sent
            .lock()
            .expect("sent lock")
            .push((reply_token.to_string(), messages));
        Ok(())
    }

    async fn bot_info(&self) -> Result<serde_json::Value, LineError> {
        Ok(serde_json::json!({ "displayName": "askline-test" }))
    }
}

/// Spawn the server and wait for GET / to respond. Returns the base URL and
/// the messaging fake for assertions.
async fn start_server() -> (String, Arc<FakeMessaging>) {
    let port = free_port();
    let config = test_config(port);
    let messaging = Arc::new(FakeMessaging::default());
    let messaging_for_server: Arc<dyn MessagingApi> = messaging.clone();
    tokio::spawn(async move {
        let _ = lib::server::run_server(config, Arc::new(FakeAnswer), messaging_for_server).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&base).send().await {
            if resp.status().is_success() {
                let json: serde_json::Value = resp.json().await.expect("parse JSON");
                assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
                return (base, messaging);
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server did not come up on {} within 5s", base);
}

#[tokio::test]
async fn callback_rejects_bad_signature_with_401() {
    let (base, messaging) = start_server().await;
    let body = r#"{"events":[]}"#;

    let resp = reqwest::Client::new()
        .post(format!("{}/callback", base))
        .header("X-Line-Signature", "bm90IGEgcmVhbCBzaWduYXR1cmU=")
        .body(body)
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.text().await.expect("body"), "invalid signature");

    // Missing header fails the same way.
    let resp = reqwest::Client::new()
        .post(format!("{}/callback", base))
        .body(body)
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 401);
    assert!(messaging.sent.lock().expect("sent lock").is_empty());
}

#[tokio::test]
async fn callback_rejects_malformed_body_with_400() {
    let (base, messaging) = start_server().await;
    let body = "{not json";

    let resp = reqwest::Client::new()
        .post(format!("{}/callback", base))
        .header("X-Line-Signature", sign(body))
        .body(body)
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.text().await.expect("body"), "bad request");
    assert!(messaging.sent.lock().expect("sent lock").is_empty());
}

#[tokio::test]
async fn callback_dispatches_and_returns_itemized_results() {
    let (base, messaging) = start_server().await;
    let body = r#"{"events":[
        {"type":"follow","replyToken":"t0"},
        {"type":"message","replyToken":"t1","message":{"type":"text","text":"hello"}},
        {"type":"message","replyToken":"t2","message":{"type":"image","id":"42"}},
        {"type":"message","replyToken":"t3"}
    ]}"#;

    let resp = reqwest::Client::new()
        .post(format!("{}/callback", base))
        .header("x-line-signature", sign(body))
        .body(body)
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 200);
    let results: serde_json::Value = resp.json().await.expect("parse JSON");
    // The payload-less message event (t3) is ignored, not a 400 for the batch.
    assert_eq!(
        results,
        serde_json::json!([null, { "status": "replied" }, null, null])
    );

    let sent = messaging.sent.lock().expect("sent lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "t1");
    match &sent[0].1[0] {
        OutboundMessage::Flex { alt_text, .. } => {
            assert_eq!(alt_text, "answer to hello");
        }
        other => panic!("expected flex reply, got {:?}", other),
    }
}

#[tokio::test]
async fn callback_accepts_body_without_events() {
    let (base, _messaging) = start_server().await;
    let body = "{}";

    let resp = reqwest::Client::new()
        .post(format!("{}/callback", base))
        .header("X-Line-Signature", sign(body))
        .body(body)
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 200);
    let results: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(results, serde_json::json!([]));
}

#[tokio::test]
async fn health_reports_bot_info_from_messaging_client() {
    let (base, _messaging) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["bot_info"]["displayName"], "askline-test");
}
