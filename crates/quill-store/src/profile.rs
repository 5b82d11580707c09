//! The in-memory profile: one user's account plus their local message
//! history.
//!
//! Field names on the wire-to-disk boundary match the flat-file record
//! format exactly (`dsuserver`, `to`, `from`, …), so a profile
//! round-trips through [`serde_json`] without a translation layer.

use serde::{Deserialize, Serialize};

use quill_protocol::Timestamp;

/// A message this user sent, as recorded in the local ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    /// Who the message was addressed to.
    #[serde(rename = "to")]
    pub recipient: String,
    /// The message text.
    pub message: String,
    /// When the message was sent, as reported at send time.
    pub timestamp: Timestamp,
}

/// A message this user received, as recorded in the local ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    /// Who the message came from.
    #[serde(rename = "from")]
    pub sender: String,
    /// The message text.
    pub message: String,
    /// When the server says the message was sent.
    pub timestamp: Timestamp,
}

/// A user account with its friends list and message ledgers.
///
/// The two ledgers are append-only by convention: [`add_sent`] and
/// [`add_received`] only ever push, and nothing here removes or reorders
/// entries. Deduplication is the caller's concern — fetching the full
/// history twice and appending it twice records it twice.
///
/// [`add_sent`]: Profile::add_sent
/// [`add_received`]: Profile::add_received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The DSU server host this profile belongs to, if one was recorded.
    #[serde(rename = "dsuserver", default)]
    pub server: Option<String>,
    /// The account username.
    pub username: String,
    /// The account password, stored in the clear. The flat file is only
    /// as private as the directory it lives in.
    pub password: String,
    /// Free-form biography text.
    #[serde(default)]
    pub bio: String,
    /// Known contacts, in insertion order, no duplicates.
    #[serde(default)]
    pub friends: Vec<String>,
    /// Ledger of messages sent from this account.
    #[serde(default)]
    pub message_sent: Vec<SentMessage>,
    /// Ledger of messages received by this account.
    #[serde(default)]
    pub message_received: Vec<ReceivedMessage>,
}

impl Profile {
    /// Creates a profile for an account on the given server.
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        Self {
            server: Some(server.to_string()),
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    /// Adds a contact to the friends list.
    ///
    /// Idempotent: adding a name that is already present changes nothing
    /// and keeps the original insertion order. Returns whether the name
    /// was newly added.
    pub fn add_friend(&mut self, name: &str) -> bool {
        if self.friends.iter().any(|f| f == name) {
            return false;
        }
        self.friends.push(name.to_string());
        true
    }

    /// Appends a message to the sent ledger.
    pub fn add_sent(&mut self, recipient: &str, message: &str, timestamp: Timestamp) {
        self.message_sent.push(SentMessage {
            recipient: recipient.to_string(),
            message: message.to_string(),
            timestamp,
        });
    }

    /// Appends a message to the received ledger.
    pub fn add_received(&mut self, sender: &str, message: &str, timestamp: Timestamp) {
        self.message_received.push(ReceivedMessage {
            sender: sender.to_string(),
            message: message.to_string(),
            timestamp,
        });
    }
}

// =========================================================================
// Tests
// =========================================================================
