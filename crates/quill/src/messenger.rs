//! The high-level messenger: send and fetch direct messages.
//!
//! A [`Messenger`] holds an account's coordinates and credentials; each
//! operation dials the server, authenticates, runs one exchange, and
//! closes the connection. The session machinery underneath supports
//! longer-lived connections, but one-session-per-operation keeps the
//! messenger free of connection state and makes every operation
//! independently retryable.

use quill_protocol::{
    FetchMode, FetchRequest, ProtocolError, Response, SendRequest, Timestamp,
};
use quill_session::{Session, SessionConfig};
use quill_transport::{TcpConnection, TransportConfig};
use serde::Serialize;

use crate::Error;

/// A direct message with both endpoints resolved.
///
/// The wire format only carries the sender of a fetched message; the
/// messenger fills in the recipient (always the local account, since a
/// fetch returns the local mailbox).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    /// Who sent the message.
    pub sender: String,
    /// Who the message was delivered to.
    pub recipient: String,
    /// The message text.
    pub text: String,
    /// When the server says the message was sent. Opaque: compare with
    /// [`Timestamp::as_secs_f64`] if you need an ordering.
    pub timestamp: Timestamp,
}

/// A client for one account on one DSU server.
///
/// Cheap to construct and clone; no connection is held between
/// operations.
#[derive(Debug, Clone)]
pub struct Messenger {
    server: String,
    username: String,
    password: String,
    session_config: SessionConfig,
    transport_config: TransportConfig,
}

impl Messenger {
    /// Creates a messenger for an account on the given server host,
    /// using the default port and timeouts.
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
            session_config: SessionConfig::default(),
            transport_config: TransportConfig::default(),
        }
    }

    /// Overrides the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.session_config.port = port;
        self
    }

    /// Overrides the connect/read timeouts.
    pub fn with_transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// The account username this messenger operates as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The server host this messenger dials.
    pub fn server(&self) -> &str {
        &self.server
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Sends `text` as a direct message to `recipient`.
    ///
    /// The timestamp is taken at send time and travels with the message.
    /// An error status from the server (expired token, unknown
    /// recipient, whatever it chooses to report) comes back as
    /// [`Error::Rejected`].
    pub async fn send(&self, text: &str, recipient: &str) -> Result<(), Error> {
        let response = self
            .exchange_once(|token| {
                SendRequest::new(token, recipient, text, Timestamp::now())
            })
            .await?;
        if !response.is_ok() {
            return Err(Error::Rejected(rejection_reason(&response)));
        }
        tracing::debug!(recipient, "direct message sent");
        Ok(())
    }

    /// Fetches messages delivered since the last fetch.
    ///
    /// An empty mailbox is `Ok` with an empty vec. A response that
    /// carries no message list at all — the server answered, but not
    /// with messages — is an error, never silently empty.
    pub async fn fetch_new(&self) -> Result<Vec<MessageRecord>, Error> {
        self.fetch(FetchMode::New).await
    }

    /// Fetches the full received-message history.
    pub async fn fetch_all(&self) -> Result<Vec<MessageRecord>, Error> {
        self.fetch(FetchMode::All).await
    }

    async fn fetch(&self, mode: FetchMode) -> Result<Vec<MessageRecord>, Error> {
        let response = self
            .exchange_once(|token| FetchRequest::new(token, mode))
            .await?;
        if !response.is_ok() {
            return Err(Error::Rejected(rejection_reason(&response)));
        }
        match response.payload {
            quill_protocol::ResponsePayload::Messages(messages) => {
                tracing::debug!(count = messages.len(), ?mode, "messages fetched");
                Ok(messages
                    .into_iter()
                    .map(|m| MessageRecord {
                        sender: m.sender,
                        recipient: self.username.clone(),
                        text: m.message,
                        timestamp: m.timestamp,
                    })
                    .collect())
            }
            _ => Err(ProtocolError::InvalidMessage(
                "fetch response carried no message list".into(),
            )
            .into()),
        }
    }

    // -----------------------------------------------------------------
    // Session plumbing
    // -----------------------------------------------------------------

    /// Dials, authenticates, runs one exchange, and closes — the
    /// connection is released on success and failure alike.
    async fn exchange_once<T, F>(&self, request_for: F) -> Result<Response, Error>
    where
        T: Serialize,
        F: FnOnce(&str) -> T,
    {
        let addr = self.session_config.addr(&self.server);
        let conn = TcpConnection::connect(&addr, &self.transport_config).await?;
        let mut session = Session::open(conn, &self.username, &self.password).await?;

        let request = request_for(session.token());
        match session.exchange(&request).await {
            Ok(response) => {
                session.close().await?;
                Ok(response)
            }
            Err(err) => {
                let _ = session.close().await;
                Err(err.into())
            }
        }
    }
}

fn rejection_reason(response: &Response) -> String {
    response
        .error_message()
        .unwrap_or("server reported an error")
        .to_string()
}
