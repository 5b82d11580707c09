use std::time::Duration;

/// Errors that can occur in the transport layer.
///
/// Every variant is recoverable from the caller's point of view: retry,
/// re-authenticate, or report — never crash the calling context.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Dialing the server failed (refused, unreachable, DNS).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// A connect or read did not complete within the configured deadline.
    ///
    /// A server that accepts the connection and then goes silent produces
    /// this instead of hanging the caller forever.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The peer closed the connection where a frame was expected.
    #[error("connection closed")]
    ConnectionClosed,
}
