//! Error types for the session layer.

use quill_protocol::ProtocolError;
use quill_transport::TransportError;

/// Errors that can occur while opening or using a session.
///
/// These cover the full client-side lifecycle: dialing, the join
/// handshake, and request/response exchanges on the open connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected the join — wrong credentials, unknown user,
    /// or whatever else it chose to report. Carries the server-supplied
    /// reason when there is one.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The server reported success but issued no token. Without a token
    /// no further request can be made, so this is an authentication
    /// failure in all but name.
    #[error("authentication failed: no token received")]
    NoToken,

    /// The connection dropped or timed out underneath the session.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A request could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
