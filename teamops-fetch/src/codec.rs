//! JSON codec.
//!
//! Response bodies are decoded leniently: malformed or empty input becomes
//! `None` so callers can tell "no usable body" apart from a transport
//! failure. Typed decoding of an already parsed value is strict and reports
//! which type failed.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::CodecError;

/// Decodes a raw response body.
///
/// Returns `None` for empty or malformed input.
pub fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "Response body is not valid JSON");
            None
        }
    }
}

/// Decodes a parsed value into a typed struct.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|source| CodecError::Shape {
        target: std::any::type_name::<T>(),
        source,
    })
}

/// Encodes a value as JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}
