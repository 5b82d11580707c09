//! Transport layer for quill.
//!
//! Provides the [`Connection`] trait that the session layer is generic
//! over, plus the concrete [`TcpConnection`] that speaks CRLF-delimited
//! frames over a TCP stream.
//!
//! Keeping the trait seam here means the session and messenger layers can
//! be tested against a scripted in-memory peer, with no sockets involved.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::TcpConnection;

use std::fmt;
use std::time::Duration;

/// Opaque identifier for a connection, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Timeouts applied to every connection.
///
/// There is no "no timeout" setting on reads: a blocking read with no
/// deadline against an unresponsive server hangs the caller indefinitely,
/// so the deadline is always enforced and merely configurable.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Deadline for each frame read.
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// A single connection that can exchange delimiter-terminated frames.
pub trait Connection: Send + 'static {
    /// Sends one already-encoded frame (delimiter included).
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Receives the next frame, delimiter included.
    ///
    /// Returns `Ok(None)` when the peer cleanly closed the connection.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Closes the connection. Consumes the value so a closed connection
    /// cannot be used again.
    async fn close(self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_config_defaults_enforce_read_timeout() {
        let config = TransportConfig::default();
        assert!(config.read_timeout > Duration::ZERO);
        assert!(config.connect_timeout > Duration::ZERO);
    }
}
