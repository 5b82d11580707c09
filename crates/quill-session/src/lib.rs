//! Client session management for quill.
//!
//! This crate owns one job: turning a raw connection into an
//! authenticated [`Session`] via the join handshake, and tearing it down
//! again.
//!
//! # How it fits in the stack
//!
//! ```text
//! Messenger (above)  ← runs send/fetch exchanges on a session
//!     ↕
//! Session layer (this crate)  ← join handshake, token, explicit close
//!     ↕
//! Protocol + Transport (below)  ← frames and sockets
//! ```

mod error;
mod session;

pub use error::SessionError;
pub use session::{DEFAULT_PORT, Session, SessionConfig};
