//! Data URL envelope for rendered file contents.
//!
//! Decoding accepts `data:[<mediatype>][;base64],<data>` with either base64 or
//! percent-encoded payloads. Encoding always produces the base64 form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::MergeError;

const SCHEME: &str = "data:";
const ENCODED_PREFIX: &str = "data:text/plain;charset=utf-8;base64,";

/// Wraps raw file bytes in a data URL
pub fn encode(data: &[u8]) -> String {
    format!("{ENCODED_PREFIX}{}", STANDARD.encode(data))
}

/// Extracts the raw file bytes from a data URL
pub fn decode(source: &str) -> Result<Vec<u8>, MergeError> {
    let rest = source
        .strip_prefix(SCHEME)
        .ok_or_else(|| MergeError::Envelope("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MergeError::Envelope("missing ',' separator".to_string()))?;

    let is_base64 = header
        .rsplit(';')
        .next()
        .map(|param| param.trim().eq_ignore_ascii_case("base64"))
        .unwrap_or(false);

    if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| MergeError::Envelope(format!("invalid base64 payload: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(payload: &str) -> Result<Vec<u8>, MergeError> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| MergeError::Envelope(format!("invalid escape at offset {i}")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
