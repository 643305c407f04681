//! X-Line-Signature verification: HMAC-SHA256 over the raw request body,
//! base64-encoded, compared against the header value.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the exact raw request bytes.
///
/// When no channel secret is configured verification always succeeds; this is
/// the explicit local-development mode (the server warns about it at startup).
/// A configured secret with a missing header fails. Comparison goes through
/// `Mac::verify_slice`, which is constant-time.
pub fn verify_signature(raw_body: &[u8], signature: Option<&str>, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    let Some(signature) = signature else {
        return false;
    };
    let Ok(provided) = base64::engine::general_purpose::STANDARD.decode(signature) else {
        return false;
    };
    // HMAC accepts any key length, so this cannot fail for a real secret.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}
