//! TCP connection implementation with per-read timeouts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

use crate::{Connection, ConnectionId, TransportConfig, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP-based [`Connection`] speaking newline-terminated frames.
pub struct TcpConnection {
    id: ConnectionId,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    read_timeout: Duration,
}

impl TcpConnection {
    /// Dials `addr` (a `host:port` string) under the configured connect
    /// timeout.
    pub async fn connect(
        addr: &str,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        let stream = timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::Timeout(config.connect_timeout))?
            .map_err(TransportError::ConnectFailed)?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, addr, "TCP connection established");

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            id,
            reader: BufReader::new(read_half),
            writer: write_half,
            read_timeout: config.read_timeout,
        })
    }
}

impl Connection for TcpConnection {
    async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.writer
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        self.writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut frame = Vec::new();
        let read = timeout(self.read_timeout, self.reader.read_until(b'\n', &mut frame))
            .await
            .map_err(|_| TransportError::Timeout(self.read_timeout))?
            .map_err(TransportError::ReceiveFailed)?;

        if read == 0 {
            tracing::debug!(id = %self.id, "peer closed connection");
            return Ok(None);
        }
        Ok(Some(frame))
    }

    async fn close(mut self) -> Result<(), TransportError> {
        tracing::debug!(id = %self.id, "closing connection");
        self.writer
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
