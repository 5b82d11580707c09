//! Unified error type for the quill client.

use quill_protocol::ProtocolError;
use quill_session::SessionError;
use quill_store::StoreError;
use quill_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quill` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server accepted the request frame but answered with an error
    /// status. Carries the server-supplied reason when there is one.
    #[error("server rejected the request: {0}")]
    Rejected(String),

    /// A transport-level error (connection, send, recv, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (auth, missing token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A storage-level error (I/O, corrupt record).
    #[error(transparent)]
    Store(#[from] StoreError),
}
