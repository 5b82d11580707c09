//! Core protocol types for the DSU wire format.
//!
//! This module defines every shape that travels "on the wire" — the
//! structures that get serialized to JSON, framed with CRLF, sent to the
//! server, and the response envelope that comes back.
//!
//! The field names and nesting here are the protocol. A rename or a
//! reordering is a wire-compatibility break, which is why the tests below
//! assert exact JSON shapes and not just round-trip equality.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The server's success sentinel for `response.type`.
pub const STATUS_OK: &str = "ok";

/// The conventional failure value for `response.type`. The protocol only
/// promises "not the ok sentinel" on failure, so treat any non-ok status
/// as an error — this constant exists for synthesizing responses, not for
/// matching against.
pub const STATUS_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// An opaque message timestamp.
///
/// The DSU server is loose about timestamps: some deployments emit seconds
/// since the epoch as a JSON number, others as a string (and a few test
/// servers emit non-numeric strings). The client treats the value as
/// opaque — it is carried through verbatim and only interpreted when a
/// caller asks for a sort key via [`Timestamp::as_secs_f64`].
///
/// `#[serde(untagged)]` makes serde try each variant in order: a JSON
/// number becomes `Number`, a JSON string becomes `Text`, and whatever
/// shape came in is what goes back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Seconds since the Unix epoch, as a JSON number.
    Number(f64),
    /// Any string value, carried verbatim.
    Text(String),
}

impl Timestamp {
    /// The current wall-clock time as seconds since the Unix epoch.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self::Number(secs)
    }

    /// Numeric interpretation for sorting, if the value has one.
    ///
    /// Returns `None` for non-numeric strings. Callers merging sent and
    /// received ledgers chronologically should sort on this, treating
    /// `None` however suits their display.
    pub fn as_secs_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Timestamp {
    fn from(secs: f64) -> Self {
        Self::Number(secs)
    }
}

impl From<&str> for Timestamp {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// ---------------------------------------------------------------------------
// Requests (client → server)
// ---------------------------------------------------------------------------

/// Which slice of the mailbox a fetch request asks for.
///
/// Serialized as the bare strings `"new"` / `"all"` — a fetch request puts
/// this directly in the `directmessage` field where a send request would
/// put an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Only messages that arrived since the last fetch.
    New,
    /// The full message history the server holds for this user.
    All,
}

/// The authentication handshake request:
/// `{"join": {"username": ..., "password": ..., "token": ""}}`.
///
/// The empty `token` field is a protocol quirk — the server expects the
/// key to be present on a first join even though there is no token yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// The nested join payload.
    pub join: JoinPayload,
}

/// The body of a [`JoinRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPayload {
    pub username: String,
    pub password: String,
    /// Always the empty placeholder on an initial join.
    pub token: String,
}

impl JoinRequest {
    /// Builds a join request with the empty token placeholder.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            join: JoinPayload {
                username: username.into(),
                password: password.into(),
                token: String::new(),
            },
        }
    }
}

/// A direct-message send request:
/// `{"token": ..., "directmessage": {"entry": ..., "recipient": ..., "timestamp": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    /// The session token issued by the join handshake.
    pub token: String,
    /// The message being sent.
    pub directmessage: DirectMessage,
}

/// The body of a [`SendRequest`]. `entry` is the protocol's name for the
/// message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub entry: String,
    pub recipient: String,
    pub timestamp: Timestamp,
}

impl SendRequest {
    pub fn new(
        token: impl Into<String>,
        recipient: impl Into<String>,
        entry: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            token: token.into(),
            directmessage: DirectMessage {
                entry: entry.into(),
                recipient: recipient.into(),
                timestamp,
            },
        }
    }
}

/// A mailbox retrieval request:
/// `{"token": ..., "directmessage": "new"|"all"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub token: String,
    pub directmessage: FetchMode,
}

impl FetchRequest {
    pub fn new(token: impl Into<String>, mode: FetchMode) -> Self {
        Self {
            token: token.into(),
            directmessage: mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses (server → client)
// ---------------------------------------------------------------------------

/// One message as the server delivers it inside a fetch response:
/// `{"from": ..., "message": ..., "timestamp": ...}`.
///
/// The server never includes the recipient — a fetch only ever returns
/// the local user's own mailbox, so the recipient is implied. The facade
/// layer fills it in when mapping to its message records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(rename = "from")]
    pub sender: String,
    pub message: String,
    pub timestamp: Timestamp,
}

/// The payload slot of a server response.
///
/// The protocol uses the singular `message` key for human-readable text
/// (errors, acknowledgements) and the plural `messages` key for fetched
/// mailbox contents. Both keys must be checked on decode; a response with
/// neither decodes to `Unknown`, which callers must treat as "retrieval
/// failed" — it is NOT the same as an empty mailbox, which arrives as
/// `Messages(vec![])`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Human-readable text from the `message` key.
    Text(String),
    /// Fetched messages from the `messages` key (possibly empty).
    Messages(Vec<WireMessage>),
    /// Neither payload key was present, or the payload had an
    /// unrecognizable shape.
    Unknown,
}

impl ResponsePayload {
    /// Whether this is the structurally-unexpected sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// A decoded server response.
///
/// Produced only by [`decode_response`](crate::decode_response), which
/// never fails — malformed input becomes a synthetic error response, so
/// this type always exists for every frame read off the socket.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The `response.type` value; [`STATUS_OK`] on success.
    pub status: String,
    /// The payload, from whichever of `message`/`messages` was present.
    pub payload: ResponsePayload,
    /// The session token, present on a successful join.
    pub token: Option<String>,
}

impl Response {
    /// Whether the server reported success.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The human-readable reason on a failed response, when the server
    /// supplied one.
    pub fn error_message(&self) -> Option<&str> {
        match &self.payload {
            ResponsePayload::Text(text) => Some(text),
            _ => None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
