//! Answer post-processing: strip inline citation markers.
//!
//! The answer service decorates its text with bracketed numeric source
//! references like `[1]` or `［２３］`. They are presentation noise in a chat
//! reply, so they are removed before the reply is composed.

use regex::Regex;
use std::sync::OnceLock;

/// A bracket pair (half- or full-width) containing only digits (half- or
/// full-width). Brackets with any other content are left alone.
fn citation_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\[\(（［【〔][0-9０-９]+[\]\)）］】〕]").expect("citation marker pattern")
    })
}

/// Remove every citation marker, then trim surrounding whitespace. Applied
/// once, before length-capping; never reorders or rewords the remaining text.
pub fn strip_citations(raw: &str) -> String {
    citation_marker().replace_all(raw, "").trim().to_string()
}
