//! Transport encoding for block payloads.
//!
//! Block contents travel to the client inside `data-*` attributes, so
//! they are base64-encoded UTF-8. Decoding exists for consumers that
//! need the original text back (and for round-trip verification).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Failure to decode a payload attribute.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode block text for embedding in an HTML attribute.
#[must_use]
pub fn encode_payload(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a payload attribute back to the original block text.
pub fn decode_payload(encoded: &str) -> Result<String, PayloadError> {
    Ok(String::from_utf8(STANDARD.decode(encoded)?)?)
}
