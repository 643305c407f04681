//! Minimal markdown → Flex box renderer.
//!
//! Renders answer text into a vertical box of text components: headings are
//! emphasized, list items get a bullet, everything else becomes wrapped body
//! text. Rendering fidelity is not a goal — the composed reply always carries
//! the full answer in its copy action, so a plain rendering is acceptable.

use serde_json::{json, Value};

/// Render markdown-ish text into a Flex box component.
pub fn to_flex_box(text: &str) -> Value {
    let mut contents: Vec<Value> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        contents.push(render_line(line));
    }
    if contents.is_empty() {
        // Flex boxes reject empty contents; keep a blank filler component.
        contents.push(json!({ "type": "text", "text": " ", "size": "sm" }));
    }
    json!({
        "type": "box",
        "layout": "vertical",
        "spacing": "md",
        "contents": contents,
    })
}

fn render_line(line: &str) -> Value {
    if let Some(rest) = line.strip_prefix("# ") {
        return json!({
            "type": "text",
            "text": strip_emphasis(rest),
            "weight": "bold",
            "size": "lg",
            "wrap": true,
        });
    }
    if let Some(rest) = line.strip_prefix("## ").or_else(|| line.strip_prefix("### ")) {
        return json!({
            "type": "text",
            "text": strip_emphasis(rest),
            "weight": "bold",
            "size": "md",
            "wrap": true,
        });
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return json!({
            "type": "text",
            "text": format!("• {}", strip_emphasis(rest)),
            "size": "sm",
            "wrap": true,
        });
    }
    json!({
        "type": "text",
        "text": strip_emphasis(line),
        "size": "sm",
        "wrap": true,
    })
}

/// Drop `**` emphasis markers; LINE text components have no inline styling.
fn strip_emphasis(s: &str) -> String {
    s.replace("**", "")
}
