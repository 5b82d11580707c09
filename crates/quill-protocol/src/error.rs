//! Error types for the protocol layer.
//!
//! Each crate in quill defines its own error enum. A `ProtocolError`
//! always means serialization trouble, never networking or storage.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a request into frame bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning frame bytes into a typed value).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// truncated frame. Note that server *responses* never produce this —
    /// [`decode_response`](crate::decode_response) converts malformed
    /// replies into an error-valued [`Response`](crate::Response) instead.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is invalid at the protocol level — e.g.
    /// a fetch response that carries neither payload key.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
