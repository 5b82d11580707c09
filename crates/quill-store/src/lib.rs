//! Flat-file profile persistence for quill.
//!
//! A [`Profile`] is a user account plus two append-only message ledgers;
//! a [`ProfileStore`] reads and writes one profile to a single JSON file.
//! Every store operation is credential-gated: loading someone else's
//! file yields nothing, and saving over it is refused rather than
//! clobbering.

mod error;
mod profile;
mod store;

pub use error::StoreError;
pub use profile::{Profile, ReceivedMessage, SentMessage};
pub use store::ProfileStore;
