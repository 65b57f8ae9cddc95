// utils.rs - Payload helpers shared by the handlers
use base64::prelude::*;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATA_URL_PREFIX: Regex = Regex::new(r"^data:[^;,]*;base64,").unwrap();
}

/// Strip a leading `data:<mime>;base64,` prefix, if present.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    match DATA_URL_PREFIX.find(payload) {
        Some(prefix) => &payload[prefix.end()..],
        None => payload,
    }
}

/// Decode a raw or data-URL base64 image into bytes. Whitespace (line-wrapped
/// base64) is ignored.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded: String = strip_data_url_prefix(payload.trim())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    BASE64_STANDARD.decode(encoded)
}
