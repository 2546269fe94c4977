//! Hex text transcoding for segment payloads.
//!
//! Payloads are stored as lowercase two-digit byte tokens separated by a
//! single space, e.g. `ff d8 ff e0`. Decoding accepts any whitespace between
//! tokens and either letter case.

use crate::error::{Error, Result};

/// Encode bytes as space-separated lowercase hex tokens.
pub fn encode(bytes: &[u8]) -> String {
    let digits = hex::encode(bytes);
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, pair) in digits.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // hex::encode only yields ASCII digits
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }
    out
}

/// Decode whitespace-separated hex tokens back into bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidHex`] for the first token that is not exactly
/// two hex digits.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() / 3 + 1);
    for (position, token) in text.split_whitespace().enumerate() {
        let mut byte = [0u8; 1];
        if token.len() != 2 || hex::decode_to_slice(token, &mut byte).is_err() {
            return Err(Error::InvalidHex {
                position,
                token: token.to_string(),
            });
        }
        out.push(byte[0]);
    }
    Ok(out)
}
