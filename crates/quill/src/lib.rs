//! # Quill
//!
//! A direct-messaging client for DSU servers: a line-oriented JSON
//! protocol over TCP, plus flat-file profile persistence.
//!
//! The workspace is layered; this meta-crate re-exports the pieces most
//! applications need:
//!
//! - [`Messenger`] — send a message, fetch new or all messages.
//! - [`InboxPoller`] — background task that keeps the inbox fresh.
//! - [`Profile`] / [`ProfileStore`] — the local account record and its
//!   credential-gated file storage.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quill::Messenger;
//!
//! # async fn demo() -> Result<(), quill::Error> {
//! let messenger = Messenger::new("127.0.0.1", "jsmith", "1234");
//! messenger.send("Hello!", "alice").await?;
//!
//! for record in messenger.fetch_new().await? {
//!     println!("{}: {}", record.sender, record.text);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod messenger;
mod poller;

pub use error::Error;
pub use messenger::{MessageRecord, Messenger};
pub use poller::InboxPoller;

pub use quill_poll::{PollConfig, PollMetrics, PollScheduler};
pub use quill_protocol::{FetchMode, Timestamp};
pub use quill_session::{DEFAULT_PORT, Session, SessionConfig, SessionError};
pub use quill_store::{Profile, ProfileStore, ReceivedMessage, SentMessage, StoreError};
pub use quill_transport::{TcpConnection, TransportConfig, TransportError};

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a process-wide tracing subscriber reading `RUST_LOG`, with a
/// quiet default that keeps quill's own debug output visible.
///
/// Call once at startup. Calling again (or alongside another subscriber)
/// is a no-op rather than a panic.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quill=debug,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
