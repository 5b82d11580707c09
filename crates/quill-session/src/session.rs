//! The client session: one authenticated connection to a DSU server.
//!
//! A [`Session`] is created by [`Session::open`], which performs the join
//! handshake and captures the token the server issues. From then on the
//! session can run any number of request/response exchanges, and
//! [`Session::close`] (or any failed open) releases the socket.
//!
//! The session is generic over [`Connection`], so everything here is
//! testable against a scripted peer with no network involved.

use serde::Serialize;

use quill_protocol::{FrameCodec, JoinRequest, JsonLineCodec, Response, decode_response};
use quill_transport::{Connection, ConnectionId, TransportError};

use crate::SessionError;

/// The DSU server's default listening port.
pub const DEFAULT_PORT: u16 = 3001;

/// Configuration for opening sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The server port to dial. Default: [`DEFAULT_PORT`].
    pub port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl SessionConfig {
    /// Joins a bare server host with the configured port into a dialable
    /// `host:port` address.
    ///
    /// An unbracketed IPv6 literal gets its brackets added, since
    /// `::1:3001` is not a dialable address but `[::1]:3001` is.
    pub fn addr(&self, server: &str) -> String {
        if server.contains(':') && !server.starts_with('[') {
            format!("[{server}]:{}", self.port)
        } else {
            format!("{server}:{}", self.port)
        }
    }
}

/// An open, authenticated connection.
///
/// Unlike a connect-per-call design, the session is an explicit value:
/// callers may hold it for the length of a logged-in period and run
/// several exchanges on it, or open one per operation — either way the
/// socket's lifetime is visible, and every exit path of [`open`]
/// (including all failures) either returns the session or closes the
/// connection.
///
/// [`open`]: Session::open
pub struct Session<C: Connection> {
    conn: C,
    codec: JsonLineCodec,
    username: String,
    token: String,
}

impl<C: Connection> Session<C> {
    /// Performs the join handshake on an already-established connection.
    ///
    /// Sends the join request, reads one response frame, and:
    /// - a non-ok status closes the connection and returns
    ///   [`SessionError::AuthFailed`] with the server's message;
    /// - a missing (or empty) token closes the connection and returns
    ///   [`SessionError::NoToken`];
    /// - otherwise the token is stored and the authenticated session is
    ///   returned.
    ///
    /// Transport failures during the handshake also close the connection
    /// before surfacing, so a failed open never leaks a socket.
    pub async fn open(
        mut conn: C,
        username: &str,
        password: &str,
    ) -> Result<Self, SessionError> {
        match join(&mut conn, username, password).await {
            Ok(token) => {
                tracing::debug!(id = %conn.id(), username, "session authenticated");
                Ok(Self {
                    conn,
                    codec: JsonLineCodec,
                    username: username.to_string(),
                    token,
                })
            }
            Err(err) => {
                tracing::debug!(id = %conn.id(), username, error = %err, "join failed");
                let _ = conn.close().await;
                Err(err)
            }
        }
    }

    /// Runs one request/response round trip on the open connection.
    ///
    /// The response is decoded leniently — a malformed reply comes back
    /// as an error-valued [`Response`], not an `Err`.
    pub async fn exchange<T: Serialize>(
        &mut self,
        request: &T,
    ) -> Result<Response, SessionError> {
        let frame = self.codec.encode_frame(request)?;
        self.conn.send(&frame).await?;
        let reply = self
            .conn
            .recv()
            .await?
            .ok_or(TransportError::ConnectionClosed)?;
        Ok(decode_response(&reply))
    }

    /// The token issued by the join handshake.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The username this session authenticated as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The underlying connection's identifier, for log correlation.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Closes the session, releasing the connection.
    pub async fn close(self) -> Result<(), SessionError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// The join handshake body, separated out so `open` can close the
/// connection on whichever branch fails.
async fn join<C: Connection>(
    conn: &mut C,
    username: &str,
    password: &str,
) -> Result<String, SessionError> {
    let codec = JsonLineCodec;
    let frame = codec.encode_frame(&JoinRequest::new(username, password))?;
    conn.send(&frame).await?;

    let reply = conn
        .recv()
        .await?
        .ok_or(TransportError::ConnectionClosed)?;
    let response = decode_response(&reply);

    if !response.is_ok() {
        let reason = response
            .error_message()
            .unwrap_or("server reported an error")
            .to_string();
        return Err(SessionError::AuthFailed(reason));
    }

    // An empty token is as useless as a missing one.
    match response.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(SessionError::NoToken),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use quill_protocol::{FetchMode, FetchRequest, ResponsePayload};

    /// A scripted peer: pops canned replies, records everything sent,
    /// and flags when it was closed.
    struct MockConnection {
        replies: VecDeque<Vec<u8>>,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        closed: Arc<AtomicBool>,
    }

    impl MockConnection {
        fn scripted(
            replies: &[&[u8]],
        ) -> (Self, Arc<Mutex<Vec<Vec<u8>>>>, Arc<AtomicBool>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let conn = Self {
                replies: replies.iter().map(|r| r.to_vec()).collect(),
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
            };
            (conn, sent, closed)
        }
    }

    impl Connection for MockConnection {
        async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            Ok(self.replies.pop_front())
        }

        async fn close(self) -> Result<(), TransportError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            ConnectionId::new(1)
        }
    }

    fn sent_text(sent: &Arc<Mutex<Vec<Vec<u8>>>>, index: usize) -> String {
        String::from_utf8(sent.lock().unwrap()[index].clone()).unwrap()
    }

    #[tokio::test]
    async fn test_open_stores_issued_token() {
        let (conn, sent, _) = MockConnection::scripted(&[
            br#"{"response": {"type": "ok", "token": "abc"}}"#,
        ]);

        let session = Session::open(conn, "jsmith", "1234")
            .await
            .expect("open should succeed");
        assert_eq!(session.token(), "abc");
        assert_eq!(session.username(), "jsmith");

        // The handshake frame carries the credentials and the empty
        // token placeholder, CRLF-terminated.
        let frame = sent_text(&sent, 0);
        assert!(frame.ends_with("\r\n"));
        assert!(frame.contains("\"username\":\"jsmith\""));
        assert!(frame.contains("\"password\":\"1234\""));
        assert!(frame.contains("\"token\":\"\""));
    }

    #[tokio::test]
    async fn test_open_server_error_is_auth_failed_and_closes() {
        let (conn, _, closed) = MockConnection::scripted(&[
            br#"{"response": {"type": "error", "message": "invalid password"}}"#,
        ]);

        let Err(err) = Session::open(conn, "jsmith", "wrong").await else {
            panic!("open should fail");
        };
        assert!(
            matches!(&err, SessionError::AuthFailed(reason) if reason == "invalid password")
        );
        assert!(closed.load(Ordering::SeqCst), "socket must be released");
    }

    #[tokio::test]
    async fn test_open_without_token_is_no_token() {
        let (conn, _, closed) =
            MockConnection::scripted(&[br#"{"response": {"type": "ok"}}"#]);

        let Err(err) = Session::open(conn, "jsmith", "1234").await else {
            panic!("open should fail");
        };
        assert!(matches!(err, SessionError::NoToken));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_open_with_empty_token_is_no_token() {
        let (conn, _, _) = MockConnection::scripted(&[
            br#"{"response": {"type": "ok", "token": ""}}"#,
        ]);

        let Err(err) = Session::open(conn, "jsmith", "1234").await else {
            panic!("open should fail");
        };
        assert!(matches!(err, SessionError::NoToken));
    }

    #[tokio::test]
    async fn test_open_peer_hangup_is_transport_error() {
        let (conn, _, closed) = MockConnection::scripted(&[]);

        let Err(err) = Session::open(conn, "jsmith", "1234").await else {
            panic!("open should fail");
        };
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::ConnectionClosed)
        ));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_exchange_carries_session_token() {
        let (conn, sent, _) = MockConnection::scripted(&[
            br#"{"response": {"type": "ok", "token": "abc"}}"#,
            br#"{"response": {"type": "ok", "messages": []}}"#,
        ]);

        let mut session = Session::open(conn, "jsmith", "1234")
            .await
            .expect("open should succeed");

        let request = FetchRequest::new(session.token(), FetchMode::New);
        let response = session.exchange(&request).await.expect("exchange");
        assert!(response.is_ok());
        assert_eq!(response.payload, ResponsePayload::Messages(vec![]));

        let frame = sent_text(&sent, 1);
        assert!(frame.contains("\"token\":\"abc\""));
        assert!(frame.contains("\"directmessage\":\"new\""));
    }

    #[tokio::test]
    async fn test_close_releases_connection() {
        let (conn, _, closed) = MockConnection::scripted(&[
            br#"{"response": {"type": "ok", "token": "abc"}}"#,
        ]);

        let session = Session::open(conn, "jsmith", "1234")
            .await
            .expect("open should succeed");
        session.close().await.expect("close should succeed");
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_config_default_port_and_addr() {
        let config = SessionConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.addr("127.0.0.1"), "127.0.0.1:3001");
        assert_eq!(config.addr("dsu.example.org"), "dsu.example.org:3001");
    }

    #[test]
    fn test_config_addr_brackets_ipv6_hosts() {
        let config = SessionConfig::default();
        assert_eq!(config.addr("::1"), "[::1]:3001");
        assert_eq!(config.addr("[::1]"), "[::1]:3001");
    }
}
