//! Reply composition: a Flex bubble holding the rendered answer plus a
//! copy-to-clipboard action with the full text.

use crate::line::OutboundMessage;
use crate::markdown;
use serde_json::json;

/// LINE caps altText at 400 characters; the preview only needs the opening
/// of the answer, so 200 matches the original behavior.
pub const ALT_TEXT_MAX: usize = 200;

/// Clipboard action payload limit.
pub const CLIPBOARD_MAX: usize = 1000;

/// Truncate on a character boundary (answers are frequently Japanese, so a
/// byte slice would split code points).
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Compose the rich reply for a processed answer. Deterministic: the same
/// text always yields the same structure.
pub fn compose_reply(text: &str) -> OutboundMessage {
    let contents = json!({
        "type": "bubble",
        "size": "mega",
        "body": {
            "type": "box",
            "layout": "vertical",
            "contents": [
                markdown::to_flex_box(text),
                {
                    "type": "button",
                    "action": {
                        "type": "clipboard",
                        "label": "Copy",
                        "clipboardText": truncate_chars(text, CLIPBOARD_MAX),
                    },
                },
            ],
        },
    });
    OutboundMessage::Flex {
        alt_text: truncate_chars(text, ALT_TEXT_MAX),
        contents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt_text(msg: &OutboundMessage) -> &str {
        match msg {
            OutboundMessage::Flex { alt_text, .. } => alt_text,
            other => panic!("expected flex message, got {:?}", other),
        }
    }

    #[test]
    fn short_text_is_alt_text_verbatim() {
        let msg = compose_reply("short answer");
        assert_eq!(alt_text(&msg), "short answer");
    }

    #[test]
    fn long_text_alt_text_caps_at_200_chars() {
        let text = "あ".repeat(300);
        let msg = compose_reply(&text);
        assert_eq!(alt_text(&msg).chars().count(), 200);
    }

    #[test]
    fn clipboard_payload_caps_at_1000_chars() {
        let text = "x".repeat(1500);
        let msg = compose_reply(&text);
        let OutboundMessage::Flex { contents, .. } = msg else {
            panic!("expected flex message");
        };
        let clipboard = contents["body"]["contents"][1]["action"]["clipboardText"]
            .as_str()
            .expect("clipboard text");
        assert_eq!(clipboard.chars().count(), 1000);
    }

    #[test]
    fn bubble_holds_rendered_box_then_copy_button() {
        let OutboundMessage::Flex { contents, .. } = compose_reply("# answer") else {
            panic!("expected flex message");
        };
        assert_eq!(contents["type"], "bubble");
        assert_eq!(contents["size"], "mega");
        let body = &contents["body"]["contents"];
        assert_eq!(body[0]["type"], "box");
        assert_eq!(body[1]["type"], "button");
        assert_eq!(body[1]["action"]["type"], "clipboard");
    }

    #[test]
    fn deterministic() {
        assert_eq!(compose_reply("a [1] b"), compose_reply("a [1] b"));
    }
}
