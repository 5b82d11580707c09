//! Frame codec: CRLF-delimited JSON on both directions of the wire.
//!
//! A "frame" is one UTF-8 JSON object followed by the two-byte `\r\n`
//! terminator. The codec is pure — it never touches a socket. It assumes
//! the transport layer delivers exactly one complete frame per decode
//! call; partial frames are the transport's problem, not the codec's.
//!
//! Encoding is strict (a request that can't serialize is a programming
//! error worth surfacing), but response decoding is deliberately lenient:
//! [`decode_response`] never fails, because a malformed server reply must
//! become an error *value* the caller can handle, not a crash in the read
//! path.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;
use crate::types::{Response, ResponsePayload, STATUS_ERROR, WireMessage};

/// The frame terminator: carriage-return, line-feed.
pub const FRAME_DELIMITER: &[u8; 2] = b"\r\n";

/// A codec that turns request values into wire frames and frames back
/// into typed values.
///
/// This is the same strategy seam the rest of the stack is generic over:
/// the session layer calls `encode_frame`/`decode_frame` without caring
/// that the format happens to be JSON lines.
pub trait FrameCodec: Send + Sync + 'static {
    /// Serializes a value and appends the frame delimiter.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode_frame<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Strips the delimiter and surrounding whitespace, then parses.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed or
    /// doesn't match the expected type.
    fn decode_frame<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// The one [`FrameCodec`] the DSU protocol defines: JSON + CRLF.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLineCodec;

impl FrameCodec for JsonLineCodec {
    fn encode_frame<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        let mut bytes = serde_json::to_vec(value).map_err(ProtocolError::Encode)?;
        bytes.extend_from_slice(FRAME_DELIMITER);
        Ok(bytes)
    }

    fn decode_frame<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(trim_frame(data)).map_err(ProtocolError::Decode)
    }
}

/// Strips leading/trailing ASCII whitespace, which covers the CRLF
/// terminator and any stray padding a server adds around it.
fn trim_frame(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &data[start..end]
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// The raw envelope as the server sends it. Every field is optional so
/// that a structurally odd reply still decodes and we can classify it,
/// instead of bubbling a serde error out of the read path.
#[derive(Debug, Default, serde::Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    response: RawResponse,
}

#[derive(Debug, Default, serde::Deserialize)]
struct RawResponse {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<serde_json::Value>,
    messages: Option<serde_json::Value>,
    token: Option<String>,
}

/// Decodes one response frame. Never fails.
///
/// - Malformed JSON yields the synthetic
///   `{status: "error", payload: Text("invalid response"), token: None}`.
/// - A missing `type` is treated as an error status.
/// - The singular `message` key is checked before the plural `messages`;
///   if neither is present (or the value has an unusable shape) the
///   payload is [`ResponsePayload::Unknown`].
pub fn decode_response(data: &[u8]) -> Response {
    let envelope: RawEnvelope = match serde_json::from_slice(trim_frame(data)) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Response {
                status: STATUS_ERROR.to_string(),
                payload: ResponsePayload::Text("invalid response".to_string()),
                token: None,
            };
        }
    };

    let raw = envelope.response;
    Response {
        status: raw.kind.unwrap_or_else(|| STATUS_ERROR.to_string()),
        payload: interpret_payload(raw.message.or(raw.messages)),
        token: raw.token,
    }
}

fn interpret_payload(value: Option<serde_json::Value>) -> ResponsePayload {
    match value {
        Some(serde_json::Value::String(text)) => ResponsePayload::Text(text),
        Some(value @ serde_json::Value::Array(_)) => {
            match serde_json::from_value::<Vec<WireMessage>>(value) {
                Ok(messages) => ResponsePayload::Messages(messages),
                // An array whose elements aren't message objects is as
                // unusable as no payload at all.
                Err(_) => ResponsePayload::Unknown,
            }
        }
        _ => ResponsePayload::Unknown,
    }
}

// =========================================================================
// Tests
// =========================================================================
